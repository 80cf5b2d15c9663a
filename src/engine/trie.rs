//! Rule compilation into a shared prefix trie.
//!
//! This module holds the *static* side of the engine. Every rule pattern is
//! split into [`Term`]s and threaded into one trie so that a single walk per
//! scan origin tests every rule at once (see `matcher.rs`).
//!
//! ```text
//! rules:  1 "no"            fNEG
//!         2 "no evidence of" fNEG
//!         3 "> 30 days"      fDUR
//!
//! root ─┬─ "no" ─────────── {fNEG: 1}
//!       │    └─ "evidence" ─ "of" ─ {fNEG: 2}
//!       └─ > 30 ─ "days" ── {fDUR: 3}
//! ```
//!
//! ## Layout
//!
//! Nodes live in an arena (`Vec<TrieNode>`) and refer to each other by
//! [`NodeId`]. Each node keeps one map per branch kind instead of a single
//! string-keyed map, so reserved markers can never collide with vocabulary.
//! Maps are `BTreeMap`s: compiling the same rules twice yields the same
//! structure and the same iteration order during matching.
//!
//! ## Invariants
//!
//! - `NodeId` 0 is the root.
//! - A terminal entry maps a determinant (`f`/`b` prefix + category) to the
//!   rule that produced it; at most one rule per determinant per node.
//! - The trie is never mutated after [`Trie::compile`] returns.

use crate::api::{DuplicatePolicy, EngineOptions};
use crate::error::{CompileError, Result};
use crate::{Rule, RuleId, TriggerKind};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Index of a node in the trie arena.
pub type NodeId = usize;

pub(crate) const ROOT: NodeId = 0;

/// Pattern marker matching any single token.
pub const ANY_WORD_MARKER: &str = r"\w+";
/// Pattern marker matching a token made only of uppercase letters.
pub const UPPERCASE_MARKER: &str = r"\W+";
/// Pattern marker introducing a numeric threshold (`> 30`).
pub const THRESHOLD_MARKER: &str = ">";
/// Reserved by rule files for the end of a pattern.
pub const END_MARKER: &str = "<END>";

/// One compiled element of a rule pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Word(String),
    AnyWord,
    Uppercase,
    Threshold(u32),
}

impl Term {
    /// Split `pattern` into terms.
    ///
    /// Literal words are lowercased when `case_insensitive` is set; markers are
    /// recognized before lowercasing so `\W+` keeps its meaning.
    pub fn parse_pattern(id: RuleId, pattern: &str, case_insensitive: bool) -> Result<Vec<Term>> {
        let mut terms = Vec::new();
        let mut parts = pattern.split_whitespace();

        while let Some(part) = parts.next() {
            let term = match part {
                ANY_WORD_MARKER => Term::AnyWord,
                UPPERCASE_MARKER => Term::Uppercase,
                THRESHOLD_MARKER => {
                    let next = parts.next();
                    let threshold = next.and_then(|n| n.parse::<u32>().ok()).ok_or_else(|| {
                        CompileError::InvalidThreshold { id, found: next.map(str::to_string) }
                    })?;
                    Term::Threshold(threshold)
                }
                END_MARKER => return Err(CompileError::ReservedTerm { id, term: part.to_string() }),
                word if case_insensitive => Term::Word(word.to_lowercase()),
                word => Term::Word(word.to_string()),
            };
            terms.push(term);
        }

        if terms.is_empty() {
            return Err(CompileError::EmptyPattern { id });
        }
        Ok(terms)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Word(w) => f.write_str(w),
            Term::AnyWord => f.write_str(ANY_WORD_MARKER),
            Term::Uppercase => f.write_str(UPPERCASE_MARKER),
            Term::Threshold(n) => write!(f, "{THRESHOLD_MARKER} {n}"),
        }
    }
}

/// What a terminal entry resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Terminal {
    pub rule_id: RuleId,
    pub kind: TriggerKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrieNode {
    pub(crate) words: BTreeMap<String, NodeId>,
    pub(crate) any_word: Option<NodeId>,
    pub(crate) uppercase: Option<NodeId>,
    /// Children keyed by threshold value; a token continues into every
    /// threshold it strictly exceeds.
    pub(crate) thresholds: BTreeMap<u32, NodeId>,
    pub(crate) terminal: BTreeMap<String, Terminal>,
}

impl TrieNode {
    pub fn word(&self, text: &str) -> Option<NodeId> {
        self.words.get(text).copied()
    }

    pub fn any_word(&self) -> Option<NodeId> {
        self.any_word
    }

    pub fn uppercase(&self) -> Option<NodeId> {
        self.uppercase
    }

    pub fn threshold(&self, value: u32) -> Option<NodeId> {
        self.thresholds.get(&value).copied()
    }

    /// `(determinant, rule id)` pairs ending at this node.
    pub fn terminals(&self) -> impl Iterator<Item = (&str, RuleId)> {
        self.terminal.iter().map(|(d, t)| (d.as_str(), t.rule_id))
    }

    pub fn is_terminal(&self) -> bool {
        !self.terminal.is_empty()
    }
}

/// Compiled, immutable rule trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trie {
    nodes: Vec<TrieNode>,
}

impl Trie {
    /// Compile `rules` into a trie.
    ///
    /// Rules with [`Direction::Both`](crate::Direction::Both) are inserted
    /// twice, once per direction, sharing id and pattern.
    pub fn compile(rules: &[Rule], options: &EngineOptions) -> Result<Self> {
        let mut trie = Trie { nodes: vec![TrieNode::default()] };
        let mut seen_ids = HashSet::with_capacity(rules.len());

        for rule in rules {
            if !seen_ids.insert(rule.id) {
                return Err(CompileError::DuplicateRuleId { id: rule.id });
            }
            let terms = Term::parse_pattern(rule.id, &rule.pattern, options.case_insensitive)?;
            let node = trie.insert_path(&terms);
            let terminal = Terminal { rule_id: rule.id, kind: rule.kind };
            for determinant in rule.determinants() {
                trie.bind(node, determinant, terminal, options.duplicate_policy)?;
            }
        }

        log::debug!(
            "[compile] rules={} nodes={} terminals={} case_insensitive={}",
            rules.len(),
            trie.nodes.len(),
            trie.terminal_count(),
            options.case_insensitive
        );
        Ok(trie)
    }

    /// Follow existing children as far as the terms allow, then materialize
    /// the remaining suffix. Returns the node for the last term.
    fn insert_path(&mut self, terms: &[Term]) -> NodeId {
        terms.iter().fold(ROOT, |node, term| self.child_or_insert(node, term))
    }

    fn child_or_insert(&mut self, parent: NodeId, term: &Term) -> NodeId {
        let node = &self.nodes[parent];
        let existing = match term {
            Term::Word(w) => node.word(w),
            Term::AnyWord => node.any_word,
            Term::Uppercase => node.uppercase,
            Term::Threshold(n) => node.threshold(*n),
        };
        if let Some(child) = existing {
            return child;
        }

        let child = self.nodes.len();
        self.nodes.push(TrieNode::default());
        let node = &mut self.nodes[parent];
        match term {
            Term::Word(w) => {
                node.words.insert(w.clone(), child);
            }
            Term::AnyWord => node.any_word = Some(child),
            Term::Uppercase => node.uppercase = Some(child),
            Term::Threshold(n) => {
                node.thresholds.insert(*n, child);
            }
        }
        child
    }

    fn bind(&mut self, node: NodeId, determinant: String, terminal: Terminal, policy: DuplicatePolicy) -> Result<()> {
        let slot = &mut self.nodes[node].terminal;
        if let Some(existing) = slot.get(&determinant) {
            match policy {
                DuplicatePolicy::LastWins => {
                    log::debug!(
                        "[compile] {determinant}: rule {} replaces rule {} for the same pattern",
                        terminal.rule_id,
                        existing.rule_id
                    );
                }
                DuplicatePolicy::FirstWins => {
                    log::debug!(
                        "[compile] {determinant}: rule {} ignored, rule {} already bound",
                        terminal.rule_id,
                        existing.rule_id
                    );
                    return Ok(());
                }
                DuplicatePolicy::Error => {
                    return Err(CompileError::DuplicateDeterminant {
                        id: terminal.rule_id,
                        determinant,
                        existing: existing.rule_id,
                    });
                }
            }
        }
        slot.insert(determinant, terminal);
        Ok(())
    }

    pub fn root(&self) -> &TrieNode {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> Option<&TrieNode> {
        self.nodes.get(id)
    }

    pub(crate) fn at(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn terminal_count(&self) -> usize {
        self.nodes.iter().map(|n| n.terminal.len()).sum()
    }

    /// Follow `terms` from the root without inserting anything.
    pub fn find(&self, terms: &[Term]) -> Option<&TrieNode> {
        let mut node = self.root();
        for term in terms {
            let next = match term {
                Term::Word(w) => node.word(w),
                Term::AnyWord => node.any_word,
                Term::Uppercase => node.uppercase,
                Term::Threshold(n) => node.threshold(*n),
            }?;
            node = self.at(next);
        }
        Some(node)
    }

    /// Indented outline of the trie, one branch or terminal per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(ROOT, 0, &mut out);
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.at(id);
        let indent = "  ".repeat(depth);

        for (determinant, terminal) in &node.terminal {
            out.push_str(&format!("{indent}=> {determinant} #{}\n", terminal.rule_id));
        }

        let children = node
            .words
            .iter()
            .map(|(w, &c)| (Term::Word(w.clone()), c))
            .chain(node.any_word.map(|c| (Term::AnyWord, c)))
            .chain(node.uppercase.map(|c| (Term::Uppercase, c)))
            .chain(node.thresholds.iter().map(|(&n, &c)| (Term::Threshold(n), c)));

        for (term, child) in children {
            out.push_str(&format!("{indent}{term}\n"));
            self.dump_node(child, depth + 1, out);
        }
    }
}
