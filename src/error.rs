//! Compile-time errors.
//!
//! Matching never fails: malformed numeric tokens and suffix misses are
//! silent skips. Everything that can go wrong is caught while the rule set is
//! compiled into a trie.

use crate::RuleId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("rule {id}: empty pattern")]
    EmptyPattern { id: RuleId },

    #[error("rule {id}: id already used by another rule")]
    DuplicateRuleId { id: RuleId },

    #[error("rule {id}: `>` must be followed by an unsigned integer threshold, found {found:?}")]
    InvalidThreshold { id: RuleId, found: Option<String> },

    #[error("rule {id}: `{term}` is a reserved marker and cannot be used as a literal term")]
    ReservedTerm { id: RuleId, term: String },

    #[error("rule {id}: determinant `{determinant}` already bound to rule {existing} for the same pattern")]
    DuplicateDeterminant { id: RuleId, determinant: String, existing: RuleId },
}

pub type Result<T> = std::result::Result<T, CompileError>;
