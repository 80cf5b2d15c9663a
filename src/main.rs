mod debug_report;

use fastcontext::{ContextEngine, EngineOptions, MatchTable, ScanOptions, Token, default_rules};
use std::io::{self, IsTerminal, Read};

const DEBUG_ENV: &str = "FASTCONTEXT_DEBUG_RULES";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if std::env::var_os(DEBUG_ENV).is_some() {
        stderr_log::init();
    }

    let options = EngineOptions { case_insensitive: !config.case_sensitive, ..EngineOptions::default() };
    let engine = match ContextEngine::new(default_rules(), options) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("error: built-in rules failed to compile: {err}");
            std::process::exit(1);
        }
    };

    let tokens = Token::from_words(&config.words);
    let mut matches = MatchTable::new();
    let metrics = engine.scan_with(&tokens, config.start, &mut matches, &ScanOptions { step_budget: config.budget });
    debug_report::print_run(&engine, &tokens, &matches, &metrics, config.color);
}

struct CliConfig {
    words: Vec<String>,
    start: usize,
    budget: Option<usize>,
    case_sensitive: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut words: Option<Vec<String>> = None;
    let mut start = 0;
    let mut budget = None;
    let mut case_sensitive = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("fastcontext {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--case-sensitive" => case_sensitive = true,
            "--start" => {
                let value = args.next().ok_or_else(|| "error: --start expects a value".to_string())?;
                start = parse_count("--start", &value)?;
            }
            "--budget" => {
                let value = args.next().ok_or_else(|| "error: --budget expects a value".to_string())?;
                budget = Some(parse_count("--budget", &value)?);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>();
                if !rest.is_empty() {
                    words = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--start=") => {
                start = parse_count("--start", arg.trim_start_matches("--start="))?;
            }
            _ if arg.starts_with("--budget=") => {
                budget = Some(parse_count("--budget", arg.trim_start_matches("--budget="))?);
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                words = Some(std::iter::once(arg).chain(args).collect());
                break;
            }
        }
    }

    let words = match words {
        Some(words) => words,
        None => read_stdin_words()?,
    };

    if words.is_empty() {
        return Err(format!("error: no tokens provided\n\n{}", help_text()));
    }

    Ok(CliConfig { words, start, budget, case_sensitive, color })
}

/// Stdin is read as one token per whitespace-separated word.
fn read_stdin_words() -> Result<Vec<String>, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer.split_whitespace().map(str::to_string).collect())
}

fn parse_count(flag: &str, value: &str) -> Result<usize, String> {
    value.parse().map_err(|_| format!("error: invalid {flag} '{value}' (expected a non-negative integer)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "fastcontext {version}

ConText trigger detection over pre-tokenized text using the built-in rules.

Usage:
  fastcontext [OPTIONS] [--] <token...>
  echo \"<tokens>\" | fastcontext [OPTIONS]

Each argument (or whitespace-separated stdin word) is one token.

Options:
  --start <n>           First token position to scan from. Default: 0
  --budget <n>          Stop after <n> trie steps (partial results).
  --case-sensitive      Compile the rules without case folding.
  --color               Force ANSI color output.
  --no-color            Disable ANSI color output.
  -h, --help            Show this help message.
  -V, --version         Print version information.

Environment:
  {debug_env}=1  Trace compilation and resolver decisions on stderr.

Exit codes:
  0  Success.
  1  Internal error.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        debug_env = DEBUG_ENV,
    )
}

/// Minimal `log` sink for the debug env switch.
mod stderr_log {
    use log::{LevelFilter, Log, Metadata, Record};

    struct StderrLog;

    static LOGGER: StderrLog = StderrLog;

    impl Log for StderrLog {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.target().starts_with("fastcontext")
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                eprintln!("{}", record.args());
            }
        }

        fn flush(&self) {}
    }

    pub fn init() {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    }
}
