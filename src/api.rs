use crate::engine::{ContextEngine, ScanMetrics};
use crate::error::Result;
use crate::{MatchTable, Rule, Token};
use once_cell::sync::Lazy;

static DEFAULT_ENGINE: Lazy<Result<ContextEngine>> =
    Lazy::new(|| ContextEngine::new(default_rules(), EngineOptions { case_insensitive: true, ..Default::default() }));

/// What to do when two rules with the same pattern bind the same determinant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The rule listed later replaces the earlier one.
    #[default]
    LastWins,
    /// The rule listed first is kept.
    FirstWins,
    /// Compilation fails with [`CompileError::DuplicateDeterminant`](crate::CompileError::DuplicateDeterminant).
    Error,
}

/// Options fixed when a rule set is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineOptions {
    /// Lowercase rule literals at compile time and tokens at scan time.
    pub case_insensitive: bool,
    pub duplicate_policy: DuplicatePolicy,
}

/// Options for a single scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanOptions {
    /// Maximum trie node visits before the scan gives up. `None` is unbounded.
    pub step_budget: Option<usize>,
}

/// Result from [`detect_with`].
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub matches: MatchTable,
    pub metrics: ScanMetrics,
}

/// The built-in rule set, for callers that want to compile it with their own
/// [`EngineOptions`] or extend it.
pub fn default_rules() -> Vec<Rule> {
    crate::rules::context::rules::get()
}

/// The engine compiled from the built-in rule set (case-insensitive).
pub fn default_engine() -> Result<&'static ContextEngine> {
    Lazy::force(&DEFAULT_ENGINE).as_ref().map_err(Clone::clone)
}

/// Detect context modifiers in pre-split `words` with the built-in rules.
///
/// # Example
/// ```
/// let matches = fastcontext::detect(&["patient", "denies", "chest", "pain"]).unwrap();
/// let span = matches.get("fNEG").unwrap();
/// assert_eq!((span.begin, span.end), (1, 1));
/// ```
pub fn detect<S: AsRef<str>>(words: &[S]) -> Result<MatchTable> {
    let engine = default_engine()?;
    Ok(engine.scan_from(&Token::from_words(words), 0))
}

/// Scan `tokens` from `start` with the built-in rules and report metrics.
pub fn detect_with(tokens: &[Token], start: usize, options: &ScanOptions) -> Result<ScanReport> {
    let engine = default_engine()?;
    let mut matches = MatchTable::new();
    let metrics = engine.scan_with(tokens, start, &mut matches, options);
    Ok(ScanReport { matches, metrics })
}
