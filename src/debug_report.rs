use fastcontext::{ContextEngine, MatchTable, ScanMetrics, Token};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(engine: &ContextEngine, tokens: &[Token], matches: &MatchTable, metrics: &ScanMetrics, color: bool) {
    let palette = ansi::Palette::new(color);
    let text = tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ");
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Scanning: \"{}\"", text), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Tokens ━━━", ansi::GRAY));
    print_tokens(tokens, &palette);

    println!("\n{}", palette.paint("━━━ Matches ━━━", ansi::GRAY));
    if matches.is_empty() {
        println!("{}", palette.dim("  No context triggers matched"));
        println!("\n{}", palette.dim("  Tip: Set FASTCONTEXT_DEBUG_RULES=1 to trace resolver decisions"));
    } else {
        print_matches(engine, tokens, matches, &palette);
    }

    println!("\n{}", palette.paint("━━━ Scan ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Origins: {}  │  Steps: {}  │  Candidates: {} ({} kept, {} replaced, {} skipped)",
        palette.paint(format!("{:?}", metrics.total), ansi::GREEN),
        palette.paint(metrics.origins.to_string(), ansi::BLUE),
        palette.paint(metrics.steps.to_string(), ansi::BLUE),
        palette.paint(metrics.candidates.to_string(), ansi::CYAN),
        metrics.inserted,
        metrics.replaced,
        metrics.skipped,
    );
    if metrics.budget_exhausted {
        println!("  {}", palette.paint("step budget exhausted: results are partial", ansi::YELLOW));
    }
    println!();
}

fn print_tokens(tokens: &[Token], palette: &ansi::Palette) {
    let line = tokens
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}{}", palette.dim(format!("{i}:")), t.text))
        .collect::<Vec<_>>()
        .join(" ");
    println!("  {line}");
}

fn print_matches(engine: &ContextEngine, tokens: &[Token], matches: &MatchTable, palette: &ansi::Palette) {
    for (idx, (determinant, span)) in matches.iter().enumerate() {
        let trigger = tokens
            .get(span.begin..=span.end)
            .map(|ts| ts.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        println!(
            "  {} {} {} {}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            palette.bold(palette.paint(determinant, ansi::GREEN)),
            palette.dim("│"),
            palette.paint(format!("\"{trigger}\" span {}..={}", span.begin, span.end), ansi::YELLOW),
        );

        let rule = engine.rule(span.rule_id);
        let pattern = rule.map(|r| r.pattern.as_str()).unwrap_or("?");
        let kind = rule.map(|r| format!("{:?}", r.kind)).unwrap_or_default();
        let window = rule.and_then(|r| r.window).map(|w| format!(" max {w}")).unwrap_or_default();
        println!(
            "      {} {}  {} {}  {} {}..={}{}",
            palette.dim("rule:"),
            palette.paint(format!("#{} \"{}\"", span.rule_id, pattern), ansi::CYAN),
            palette.dim("│ kind:"),
            palette.paint(kind, ansi::BLUE),
            palette.dim("│ window:"),
            span.win_begin,
            span.win_end,
            palette.dim(window),
        );
    }
}
