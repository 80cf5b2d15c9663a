extern crate self as fastcontext;

use std::collections::BTreeMap;
use std::fmt;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod rules;

pub use api::{
    DuplicatePolicy, EngineOptions, ScanOptions, ScanReport, default_engine, default_rules, detect, detect_with,
};
pub use engine::{
    ANY_WORD_MARKER, ContextEngine, ContextEngineBuilder, END_MARKER, NodeId, ScanMetrics, THRESHOLD_MARKER, Term,
    TokenShape, Trie, TrieNode, UPPERCASE_MARKER,
};
pub use error::{CompileError, Result};

// --- Rule model ---------------------------------------------------------------

/// Externally assigned rule identifier, usually the line the rule came from.
pub type RuleId = usize;

/// Which side of a trigger its scope extends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Forward,
    Backward,
    /// Expanded into one forward and one backward rule at compile time.
    Both,
}

impl Direction {
    /// Leading character of a determinant for this direction.
    ///
    /// `Both` has no prefix of its own: it never reaches the trie unexpanded.
    pub fn prefix(self) -> Option<char> {
        match self {
            Direction::Forward => Some('f'),
            Direction::Backward => Some('b'),
            Direction::Both => None,
        }
    }

    /// Recover the direction encoded in a determinant's first character.
    pub fn of_determinant(determinant: &str) -> Option<Direction> {
        match determinant.chars().next() {
            Some('f') => Some(Direction::Forward),
            Some('b') => Some(Direction::Backward),
            _ => None,
        }
    }

    pub(crate) fn expanded(self) -> &'static [Direction] {
        match self {
            Direction::Forward => &[Direction::Forward],
            Direction::Backward => &[Direction::Backward],
            Direction::Both => &[Direction::Forward, Direction::Backward],
        }
    }
}

/// What a match does to the scope window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriggerKind {
    /// Begins or extends a window.
    #[default]
    Trigger,
    /// Truncates an existing window.
    Termination,
    /// Looks like a trigger but asserts nothing (e.g. "no increase"); kept as
    /// its own category so it can shadow the real trigger.
    Pseudo,
}

/// A structured ConText rule.
///
/// The determinant stored in the trie is derived from `direction` and
/// `category`: a forward `NEG` rule yields `fNEG`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: RuleId,
    /// Whitespace-separated terms. `\w+` matches any token, `\W+` any fully
    /// uppercase token, and `> N` any numeric token greater than `N`.
    pub pattern: String,
    pub category: String,
    pub direction: Direction,
    pub kind: TriggerKind,
    /// Maximum scope length in tokens, if the rule source declares one.
    pub window: Option<usize>,
}

impl Rule {
    pub fn new(
        id: RuleId,
        pattern: impl Into<String>,
        category: impl Into<String>,
        direction: Direction,
        kind: TriggerKind,
    ) -> Self {
        Rule { id, pattern: pattern.into(), category: category.into(), direction, kind, window: None }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = Some(window);
        self
    }

    /// Determinant key for this rule compiled under `direction`.
    ///
    /// Returns `None` for `Direction::Both`, which must be expanded first.
    pub fn determinant_for(&self, direction: Direction) -> Option<String> {
        direction.prefix().map(|p| format!("{p}{}", self.category))
    }

    /// Every determinant this rule contributes once `Both` is expanded.
    pub fn determinants(&self) -> Vec<String> {
        self.direction.expanded().iter().filter_map(|&d| self.determinant_for(d)).collect()
    }
}

// --- Input tokens -------------------------------------------------------------

/// One element of the token sequence produced by an external tokenizer.
///
/// The position used in spans is the token's index in the slice handed to the
/// engine; `start`/`end` are byte offsets into the source text and are only
/// carried through for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Token { text: text.into(), start, end }
    }

    /// Build tokens from already-split words, with offsets as if they were
    /// joined by single spaces.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Vec<Token> {
        let mut offset = 0;
        words
            .iter()
            .map(|w| {
                let w = w.as_ref();
                let token = Token::new(w, offset, offset + w.len());
                offset += w.len() + 1;
                token
            })
            .collect()
    }
}

// --- Output -------------------------------------------------------------------

/// A retained trigger match and the scope window it currently governs.
///
/// `begin`/`end` are inclusive token positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextSpan {
    pub begin: usize,
    pub end: usize,
    pub width: usize,
    pub rule_id: RuleId,
    pub win_begin: usize,
    pub win_end: usize,
}

impl ContextSpan {
    pub fn new(begin: usize, end: usize, rule_id: RuleId) -> Self {
        ContextSpan { begin, end, width: end - begin, rule_id, win_begin: begin, win_end: end }
    }
}

impl fmt::Display for ContextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={} (rule {}, window {}..={})", self.begin, self.end, self.rule_id, self.win_begin, self.win_end)
    }
}

/// Result table: at most one retained span per determinant.
///
/// Only the overlap resolver inserts; callers read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchTable {
    spans: BTreeMap<String, ContextSpan>,
}

impl MatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, determinant: &str) -> Option<&ContextSpan> {
        self.spans.get(determinant)
    }

    pub fn contains(&self, determinant: &str) -> bool {
        self.spans.contains_key(determinant)
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Entries ordered by determinant.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextSpan)> {
        self.spans.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    pub(crate) fn insert(&mut self, determinant: &str, span: ContextSpan) {
        match self.spans.get_mut(determinant) {
            Some(slot) => *slot = span,
            None => {
                self.spans.insert(determinant.to_string(), span);
            }
        }
    }
}

impl IntoIterator for MatchTable {
    type Item = (String, ContextSpan);
    type IntoIter = std::collections::btree_map::IntoIter<String, ContextSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.into_iter()
    }
}
