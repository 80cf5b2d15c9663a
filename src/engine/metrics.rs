//! Scan metrics.
//!
//! Counters collected while walking the trie. They cost a few increments per
//! step, so they are always on; callers that do not care use
//! [`ContextEngine::scan`](super::ContextEngine::scan), which drops them.

use std::time::Duration;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanMetrics {
    /// Elapsed time for the whole scan.
    pub total: Duration,
    /// Scan origins walked.
    pub origins: usize,
    /// Trie node visits, counting every branch explored.
    pub steps: usize,
    /// `(determinant, rule)` pairs offered to the resolver.
    pub candidates: usize,
    pub inserted: usize,
    pub replaced: usize,
    pub skipped: usize,
    /// The step budget ran out before every origin was walked.
    pub budget_exhausted: bool,
}
