//! Trie walking.
//!
//! This module is the operational core of the engine:
//!
//! - Compile rules once into a [`Trie`] (see `trie.rs`) and keep the rule
//!   table for downstream lookups.
//! - For every scan origin, walk the trie from the root, exploring every
//!   branch the current token allows.
//! - Hand each terminal reached to the overlap resolver (`resolve.rs`), which
//!   owns the result table.
//!
//! ## Branches
//!
//! At each `(node, position)` pair the walk tries, in this order:
//!
//! ```text
//! 1. \w+     child          -> any token, advance one
//! 2. \W+     child          -> all-uppercase token, advance one
//! 3. terminal entries       -> emit [begin, pos - 1] to the resolver
//! 4. literal child == token -> advance one
//! 5. > N     children       -> numeric token, see numeric.rs
//! ```
//!
//! Several branches can succeed from the same node; all of them are explored.
//! At the end of the token sequence only step 3 applies. Recursion depth is
//! bounded by the number of tokens left, but the number of paths is not:
//! stacked wildcards and thresholds multiply. [`ScanOptions::step_budget`]
//! caps the total node visits per scan.
//!
//! The compiled trie is read-only; all scratch state (token view, counters,
//! result table) is per call, so one engine can serve many threads.

use super::metrics::ScanMetrics;
use super::resolve::{Decision, consider};
use super::shape::{TokenShape, TokenView};
use super::trie::{NodeId, ROOT, Trie, TrieNode};
use crate::api::{DuplicatePolicy, EngineOptions, ScanOptions};
use crate::error::Result;
use crate::{MatchTable, Rule, RuleId, Token};
use std::collections::BTreeMap;
use std::time::Instant;

/// Compiled ConText rule set, ready to scan token sequences.
#[derive(Debug, Clone)]
pub struct ContextEngine {
    trie: Trie,
    rules: BTreeMap<RuleId, Rule>,
    options: EngineOptions,
}

impl ContextEngine {
    /// Compile `rules`.
    pub fn new(rules: Vec<Rule>, options: EngineOptions) -> Result<Self> {
        let trie = Trie::compile(&rules, &options)?;
        let rules = rules.into_iter().map(|r| (r.id, r)).collect();
        Ok(ContextEngine { trie, rules, options })
    }

    pub fn builder() -> ContextEngineBuilder {
        ContextEngineBuilder::default()
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The rule behind a span's `rule_id`, as it was supplied (a `Both` rule
    /// is reported with `Direction::Both`).
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(&id)
    }

    /// Rules ordered by id.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// Scan `tokens` from every origin in `start..` and merge the matches
    /// into `matches`.
    pub fn scan(&self, tokens: &[Token], start: usize, matches: &mut MatchTable) {
        self.scan_with(tokens, start, matches, &ScanOptions::default());
    }

    /// Like [`scan`](Self::scan) into a fresh table.
    pub fn scan_from(&self, tokens: &[Token], start: usize) -> MatchTable {
        let mut matches = MatchTable::new();
        self.scan(tokens, start, &mut matches);
        matches
    }

    /// Scan with per-call options and return counters for the run.
    pub fn scan_with(
        &self,
        tokens: &[Token],
        start: usize,
        matches: &mut MatchTable,
        options: &ScanOptions,
    ) -> ScanMetrics {
        let began = Instant::now();
        let views = TokenView::prepare(tokens, start, self.options.case_insensitive);
        let mut walker = Walker::new(&self.trie, &views, matches, options.step_budget);

        for origin in start..views.len() {
            walker.metrics.origins += 1;
            walker.walk(ROOT, origin, origin);
            if walker.exhausted() {
                log::debug!("[scan] step budget exhausted at origin {origin}/{}", views.len());
                break;
            }
        }

        let mut metrics = walker.metrics;
        metrics.total = began.elapsed();
        log::debug!(
            "[scan] tokens={} start={start} steps={} candidates={} retained={}",
            views.len(),
            metrics.steps,
            metrics.candidates,
            matches.len()
        );
        metrics
    }
}

/// Collects rules and options before compiling a [`ContextEngine`].
#[derive(Debug, Clone, Default)]
pub struct ContextEngineBuilder {
    rules: Vec<Rule>,
    options: EngineOptions,
}

impl ContextEngineBuilder {
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.options.case_insensitive = yes;
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.options.duplicate_policy = policy;
        self
    }

    pub fn build(self) -> Result<ContextEngine> {
        ContextEngine::new(self.rules, self.options)
    }
}

/// Per-call walk state.
pub(super) struct Walker<'a, 't> {
    pub(super) trie: &'a Trie,
    pub(super) tokens: &'a [TokenView<'t>],
    matches: &'a mut MatchTable,
    metrics: ScanMetrics,
    budget: Option<usize>,
}

impl<'a, 't> Walker<'a, 't> {
    fn new(trie: &'a Trie, tokens: &'a [TokenView<'t>], matches: &'a mut MatchTable, budget: Option<usize>) -> Self {
        Walker { trie, tokens, matches, metrics: ScanMetrics::default(), budget }
    }

    pub(super) fn exhausted(&self) -> bool {
        self.metrics.budget_exhausted
    }

    /// Count one node visit; false once the budget is spent.
    fn step(&mut self) -> bool {
        if self.metrics.budget_exhausted {
            return false;
        }
        if self.budget.is_some_and(|b| self.metrics.steps >= b) {
            self.metrics.budget_exhausted = true;
            return false;
        }
        self.metrics.steps += 1;
        true
    }

    pub(super) fn walk(&mut self, id: NodeId, begin: usize, pos: usize) {
        if !self.step() {
            return;
        }
        let trie = self.trie;
        let tokens = self.tokens;
        let node = trie.at(id);

        let Some(token) = tokens.get(pos) else {
            self.emit(node, begin, pos);
            return;
        };

        if let Some(child) = node.any_word() {
            self.walk(child, begin, pos + 1);
        }
        if let Some(child) = node.uppercase() {
            if token.shape.contains(TokenShape::ALL_UPPERCASE) {
                self.walk(child, begin, pos + 1);
            }
        }
        self.emit(node, begin, pos);
        if let Some(child) = node.word(&token.text) {
            self.walk(child, begin, pos + 1);
        }
        if !node.thresholds.is_empty() && token.shape.contains(TokenShape::LEADING_DIGIT) {
            self.match_digits(node, begin, pos);
        }
    }

    /// Offer every terminal at `node` as the span `[begin, pos - 1]`.
    fn emit(&mut self, node: &TrieNode, begin: usize, pos: usize) {
        // The root is never terminal, so a terminal always sits past `begin`.
        if pos <= begin {
            return;
        }
        for (determinant, &terminal) in &node.terminal {
            self.metrics.candidates += 1;
            match consider(self.matches, determinant, terminal, begin, pos) {
                Decision::Inserted => self.metrics.inserted += 1,
                Decision::Replaced => self.metrics.replaced += 1,
                Decision::Skipped => self.metrics.skipped += 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContextSpan, Direction, TriggerKind};

    fn forward(id: RuleId, pattern: &str, category: &str) -> Rule {
        Rule::new(id, pattern, category, Direction::Forward, TriggerKind::Trigger)
    }

    fn engine(rules: Vec<Rule>) -> ContextEngine {
        ContextEngine::new(rules, EngineOptions::default()).unwrap()
    }

    fn span(table: &MatchTable, determinant: &str) -> Option<(usize, usize)> {
        table.get(determinant).map(|s| (s.begin, s.end))
    }

    #[test]
    fn literal_forward_trigger() {
        let engine = engine(vec![forward(1, "denies", "NEG")]);
        let tokens = Token::from_words(&["patient", "denies", "chest", "pain"]);
        let matches = engine.scan_from(&tokens, 0);

        assert_eq!(matches.get("fNEG"), Some(&ContextSpan::new(1, 1, 1)));
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn multi_word_pattern_at_end_of_sequence() {
        let engine = engine(vec![forward(1, "no evidence of", "NEG")]);
        let tokens = Token::from_words(&["there", "was", "no", "evidence", "of"]);
        assert_eq!(span(&engine.scan_from(&tokens, 0), "fNEG"), Some((2, 4)));
    }

    #[test]
    fn partial_pattern_does_not_match() {
        let engine = engine(vec![forward(1, "no evidence of", "NEG")]);
        let tokens = Token::from_words(&["no", "evidence", "for"]);
        assert!(engine.scan_from(&tokens, 0).is_empty());
    }

    #[test]
    fn word_wildcard_matches_any_token() {
        let engine = engine(vec![forward(1, r"free of \w+", "NEG")]);
        let tokens = Token::from_words(&["free", "of", "anything"]);
        assert_eq!(span(&engine.scan_from(&tokens, 0), "fNEG"), Some((0, 2)));
    }

    #[test]
    fn uppercase_wildcard_requires_acronym() {
        let engine = engine(vec![forward(1, r"\W+ negative", "NEG")]);

        let hit = engine.scan_from(&Token::from_words(&["HIV", "negative"]), 0);
        assert_eq!(span(&hit, "fNEG"), Some((0, 1)));

        let miss = engine.scan_from(&Token::from_words(&["Hiv", "negative"]), 0);
        assert!(miss.is_empty());
    }

    #[test]
    fn wildcard_and_literal_branches_are_both_explored() {
        // "no \w+" and "no pain" both end after "pain"; the wildcard also keeps
        // going to reach "no \w+ today".
        let engine = engine(vec![
            forward(1, r"no \w+", "NEG"),
            forward(2, "no pain", "PAIN"),
            forward(3, r"no \w+ today", "TODAY"),
        ]);
        let matches = engine.scan_from(&Token::from_words(&["no", "pain", "today"]), 0);

        assert_eq!(span(&matches, "fNEG"), Some((0, 1)));
        assert_eq!(span(&matches, "fPAIN"), Some((0, 1)));
        assert_eq!(span(&matches, "fTODAY"), Some((0, 2)));
    }

    #[test]
    fn longest_phrase_wins_for_shared_determinant() {
        let engine = engine(vec![forward(1, "no", "NEG"), forward(2, "no evidence of", "NEG")]);
        let matches = engine.scan_from(&Token::from_words(&["no", "evidence", "of", "pneumonia"]), 0);
        let retained = matches.get("fNEG").unwrap();
        assert_eq!((retained.begin, retained.end, retained.rule_id), (0, 2, 2));
    }

    #[test]
    fn start_position_skips_earlier_origins() {
        let engine = engine(vec![forward(1, "denies", "NEG")]);
        let tokens = Token::from_words(&["denies", "fever", "but", "denies", "chills"]);
        assert_eq!(span(&engine.scan_from(&tokens, 1), "fNEG"), Some((3, 3)));
        assert!(engine.scan_from(&tokens, 4).is_empty());
        assert!(engine.scan_from(&tokens, 99).is_empty());
    }

    #[test]
    fn scan_merges_into_existing_table() {
        let engine = engine(vec![forward(1, "denies", "NEG"), forward(2, "possible", "HYP")]);
        let mut matches = MatchTable::new();
        engine.scan(&Token::from_words(&["denies", "cough"]), 0, &mut matches);
        engine.scan(&Token::from_words(&["possible", "pneumonia"]), 0, &mut matches);
        assert!(matches.contains("fNEG"));
        assert!(matches.contains("fHYP"));
    }

    #[test]
    fn numeric_threshold_with_suffix() {
        let engine = engine(vec![forward(1, "> 30 days", "DUR")]);
        let matches = engine.scan_from(&Token::from_words(&["for", "60-days"]), 0);
        assert_eq!(span(&matches, "fDUR"), Some((1, 1)));
    }

    #[test]
    fn numeric_threshold_with_separate_unit_token() {
        let engine = engine(vec![forward(1, "> 30 days", "DUR")]);
        let matches = engine.scan_from(&Token::from_words(&["for", "60", "days"]), 0);
        assert_eq!(span(&matches, "fDUR"), Some((1, 2)));
    }

    #[test]
    fn numeric_threshold_is_strict_and_suffix_sensitive() {
        let engine = engine(vec![forward(1, "> 30 days", "DUR")]);
        assert!(engine.scan_from(&Token::from_words(&["30", "days"]), 0).is_empty());
        assert!(engine.scan_from(&Token::from_words(&["60-weeks"]), 0).is_empty());
        assert!(engine.scan_from(&Token::from_words(&["sixty", "days"]), 0).is_empty());
    }

    #[test]
    fn every_exceeded_threshold_is_followed() {
        let engine = engine(vec![
            forward(1, "> 7 days", "WEEK"),
            forward(2, "> 30 days", "MONTH"),
            forward(3, "> 365 days", "YEAR"),
        ]);
        let matches = engine.scan_from(&Token::from_words(&["45-days"]), 0);
        assert!(matches.contains("fWEEK"));
        assert!(matches.contains("fMONTH"));
        assert!(!matches.contains("fYEAR"));

        let clamped = engine.scan_from(&Token::from_words(&["5000-days"]), 0);
        assert_eq!(clamped.len(), 3);
    }

    #[test]
    fn case_insensitive_matching() {
        let rules = vec![forward(1, "DENIES", "NEG")];
        let tokens = Token::from_words(&["denies"]);

        let insensitive = ContextEngine::builder().rules(rules.clone()).case_insensitive(true).build().unwrap();
        assert_eq!(span(&insensitive.scan_from(&tokens, 0), "fNEG"), Some((0, 0)));

        let sensitive = ContextEngine::builder().rules(rules).build().unwrap();
        assert!(sensitive.scan_from(&tokens, 0).is_empty());
    }

    #[test]
    fn case_insensitive_scan_leaves_tokens_untouched() {
        let engine = ContextEngine::builder().rule(forward(1, "denies", "NEG")).case_insensitive(true).build().unwrap();
        let tokens = Token::from_words(&["Patient", "DENIES"]);
        assert!(engine.scan_from(&tokens, 0).contains("fNEG"));
        assert_eq!(tokens[1].text, "DENIES");
    }

    #[test]
    fn both_direction_rule_yields_two_spans() {
        let engine = engine(vec![Rule::new(4, "rule out", "HYP", Direction::Both, TriggerKind::Trigger)]);
        let matches = engine.scan_from(&Token::from_words(&["rule", "out", "pneumonia"]), 0);
        assert_eq!(span(&matches, "fHYP"), Some((0, 1)));
        assert_eq!(span(&matches, "bHYP"), Some((0, 1)));
        assert_eq!(engine.rule(4).map(|r| r.direction), Some(Direction::Both));
    }

    #[test]
    fn termination_truncates_forward_window() {
        let engine = engine(vec![
            forward(1, "no", "NEG"),
            Rule::new(2, "but", "NEG", Direction::Forward, TriggerKind::Termination),
        ]);
        let matches = engine.scan_from(&Token::from_words(&["no", "fever", "but", "has", "cough"]), 0);
        let retained = matches.get("fNEG").unwrap();
        assert_eq!((retained.begin, retained.end, retained.rule_id), (2, 2, 2));
        assert_eq!(retained.win_begin, 2);
    }

    #[test]
    fn step_budget_stops_the_scan() {
        let engine = engine(vec![forward(1, "denies", "NEG")]);
        let tokens = Token::from_words(&["a", "b", "c", "denies"]);

        let mut matches = MatchTable::new();
        let metrics = engine.scan_with(&tokens, 0, &mut matches, &ScanOptions { step_budget: Some(2) });
        assert!(metrics.budget_exhausted);
        assert_eq!(metrics.steps, 2);
        assert!(matches.is_empty());

        let mut matches = MatchTable::new();
        let metrics = engine.scan_with(&tokens, 0, &mut matches, &ScanOptions::default());
        assert!(!metrics.budget_exhausted);
        assert_eq!(metrics.origins, 4);
        assert_eq!(metrics.candidates, 1);
        assert_eq!(metrics.inserted, 1);
        assert!(matches.contains("fNEG"));
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        let engine = std::sync::Arc::new(engine(vec![forward(1, "denies", "NEG")]));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let engine = std::sync::Arc::clone(&engine);
                std::thread::spawn(move || {
                    let mut words = vec!["x"; i];
                    words.push("denies");
                    engine.scan_from(&Token::from_words(&words), 0).get("fNEG").map(|s| s.begin)
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Some(i));
        }
    }
}
