//! Compilation and matching engine.
//!
//! This module is the *public entry point* for the ConText engine. It is split
//! into focused submodules under `src/engine/` while keeping public paths
//! stable (for example `crate::engine::ContextEngine` and `crate::engine::Trie`).
//!
//! ## How the parts work together
//!
//! ```text
//! rules (all) ──┐
//!               │  Trie::compile                 (trie.rs)
//!               │    - split patterns into Terms
//!               │    - expand Both into f/b determinants
//!               └───────────────┬──────────────
//!                               │
//! tokens ── TokenView::prepare ─┼─ lowercase view + TokenShape bits
//!           (shape.rs)          │
//!                               v
//!                     Walker::walk (matcher.rs)
//!                       - one walk per origin
//!                       - \w+, \W+, literal branches
//!                       - > N branches (numeric.rs)
//!                               │ terminal reached
//!                               v
//!                     consider (resolve.rs)
//!                       - one span per determinant
//!                       - window inherit / clamp
//!                               │
//!                               v
//!                           MatchTable
//! ```
//!
//! ## Responsibilities by module
//!
//! - `trie.rs`: pattern parsing, validation, and the arena trie.
//! - `shape.rs`: per-token classification and case folding for a scan.
//! - `matcher.rs`: `ContextEngine` and the multi-branch walk.
//! - `numeric.rs`: threshold comparison for numeric tokens.
//! - `resolve.rs`: the per-determinant priority policy.
//! - `metrics.rs`: counters returned by `ContextEngine::scan_with`.
//!
//! ## Debugging
//!
//! The engine logs through the `log` facade: compile and scan summaries at
//! `debug`, every resolver decision at `trace`. The CLI turns these on with
//! `FASTCONTEXT_DEBUG_RULES=1`.

#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/numeric.rs"]
mod numeric;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/shape.rs"]
mod shape;
#[path = "engine/trie.rs"]
mod trie;

pub use matcher::{ContextEngine, ContextEngineBuilder};
pub use metrics::ScanMetrics;
pub use shape::TokenShape;
pub use trie::{ANY_WORD_MARKER, END_MARKER, NodeId, THRESHOLD_MARKER, Term, Trie, TrieNode, UPPERCASE_MARKER};
