//! Overlap resolution.
//!
//! The walker reports every terminal it reaches; this module decides, per
//! determinant, which single span survives. The result table never holds a
//! history, only the best span known so far.
//!
//! ## Priority
//!
//! A candidate replaces the retained span unless one of these holds:
//!
//! ```text
//! forward (f..):  retained.begin >= cand.end
//!                 retained.width > cand.width && retained.end >= cand.begin
//! backward (b..): retained.end <= cand.begin
//!                 retained.width > cand.width && retained.begin >= cand.end
//! ```
//!
//! So a wider retained span that overlaps or abuts the candidate wins; after
//! that, scan order and direction decide. This is not a plain max-width
//! reduction.
//!
//! ## Windows
//!
//! On replacement the candidate takes over the retained window edge on the
//! side its scope opens to. A termination match clamps that edge to itself
//! instead of inheriting it:
//!
//! ```text
//! forward:  win_begin = termination ? max(old.win_begin, cand.end)   : old.win_begin
//! backward: win_end   = termination ? min(old.win_end,   cand.begin) : old.win_end
//! ```

use super::trie::Terminal;
use crate::{ContextSpan, Direction, MatchTable, TriggerKind};

/// Outcome of offering one candidate to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Inserted,
    Replaced,
    Skipped,
}

/// Offer the span `[begin, current - 1]` for `determinant` to `table`.
pub(crate) fn consider(
    table: &mut MatchTable,
    determinant: &str,
    terminal: Terminal,
    begin: usize,
    current: usize,
) -> Decision {
    let mut candidate = ContextSpan::new(begin, current - 1, terminal.rule_id);

    let Some(retained) = table.get(determinant).copied() else {
        log::trace!("[resolve] {determinant}: insert {candidate}");
        table.insert(determinant, candidate);
        return Decision::Inserted;
    };

    let direction = Direction::of_determinant(determinant);
    if keeps_retained(direction, &retained, &candidate) {
        log::trace!("[resolve] {determinant}: keep {retained} over {candidate}");
        return Decision::Skipped;
    }

    let terminates = terminal.kind == TriggerKind::Termination;
    match direction {
        Some(Direction::Forward) => {
            candidate.win_begin = if terminates { retained.win_begin.max(candidate.end) } else { retained.win_begin };
        }
        Some(Direction::Backward) => {
            candidate.win_end = if terminates { retained.win_end.min(candidate.begin) } else { retained.win_end };
        }
        _ => {}
    }

    log::trace!("[resolve] {determinant}: replace {retained} with {candidate}");
    table.insert(determinant, candidate);
    Decision::Replaced
}

fn keeps_retained(direction: Option<Direction>, retained: &ContextSpan, candidate: &ContextSpan) -> bool {
    match direction {
        Some(Direction::Forward) => {
            retained.begin >= candidate.end
                || (retained.width > candidate.width && retained.end >= candidate.begin)
        }
        Some(Direction::Backward) => {
            retained.end <= candidate.begin
                || (retained.width > candidate.width && retained.begin >= candidate.end)
        }
        // Determinants without a direction prefix always take the latest span.
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleId;

    fn trigger(rule_id: RuleId) -> Terminal {
        Terminal { rule_id, kind: TriggerKind::Trigger }
    }

    fn termination(rule_id: RuleId) -> Terminal {
        Terminal { rule_id, kind: TriggerKind::Termination }
    }

    #[test]
    fn first_candidate_is_installed_with_its_own_window() {
        let mut table = MatchTable::new();
        assert_eq!(consider(&mut table, "fNEG", trigger(1), 1, 2), Decision::Inserted);
        assert_eq!(table.get("fNEG"), Some(&ContextSpan::new(1, 1, 1)));
    }

    #[test]
    fn forward_keeps_wider_overlapping_span_in_either_order() {
        // "no evidence of" (0..=2) against "evidence" (1..=1)
        let mut table = MatchTable::new();
        consider(&mut table, "fNEG", trigger(1), 0, 3);
        assert_eq!(consider(&mut table, "fNEG", trigger(2), 1, 2), Decision::Skipped);
        assert_eq!(table.get("fNEG").map(|s| s.rule_id), Some(1));

        let mut table = MatchTable::new();
        consider(&mut table, "fNEG", trigger(2), 1, 2);
        assert_eq!(consider(&mut table, "fNEG", trigger(1), 0, 3), Decision::Replaced);
        assert_eq!(table.get("fNEG").map(|s| (s.begin, s.end)), Some((0, 2)));
    }

    #[test]
    fn forward_prefers_later_span_of_equal_width() {
        let mut table = MatchTable::new();
        consider(&mut table, "fNEG", trigger(1), 1, 2);
        assert_eq!(consider(&mut table, "fNEG", trigger(2), 4, 5), Decision::Replaced);
        let span = table.get("fNEG").unwrap();
        assert_eq!((span.begin, span.end, span.rule_id), (4, 4, 2));
        // non-termination replacement inherits the retained window start
        assert_eq!(span.win_begin, 1);
    }

    #[test]
    fn forward_skips_candidate_ending_before_retained_begin() {
        let mut table = MatchTable::new();
        table.insert("fNEG", ContextSpan::new(5, 5, 1));
        assert_eq!(consider(&mut table, "fNEG", trigger(2), 3, 4), Decision::Skipped);
    }

    #[test]
    fn backward_skips_candidate_after_retained_end() {
        let mut table = MatchTable::new();
        consider(&mut table, "bNEG", trigger(1), 2, 3);
        assert_eq!(consider(&mut table, "bNEG", trigger(2), 6, 7), Decision::Skipped);
        assert_eq!(table.get("bNEG").map(|s| s.rule_id), Some(1));
    }

    #[test]
    fn backward_replacement_inherits_window_end() {
        let mut table = MatchTable::new();
        table.insert("bNEG", ContextSpan { win_end: 9, ..ContextSpan::new(6, 7, 1) });
        assert_eq!(consider(&mut table, "bNEG", trigger(2), 3, 5), Decision::Replaced);
        let span = table.get("bNEG").unwrap();
        assert_eq!((span.begin, span.end, span.win_begin, span.win_end), (3, 4, 3, 9));
    }

    #[test]
    fn forward_termination_clamps_window_start() {
        let mut table = MatchTable::new();
        table.insert("fNEG", ContextSpan { win_end: 10, ..ContextSpan::new(0, 0, 1) });
        assert_eq!(consider(&mut table, "fNEG", termination(2), 5, 6), Decision::Replaced);
        let span = table.get("fNEG").unwrap();
        assert_eq!(span.rule_id, 2);
        assert_eq!(span.win_begin, 5);
    }

    #[test]
    fn backward_termination_clamps_window_end() {
        let mut table = MatchTable::new();
        table.insert("bNEG", ContextSpan { win_begin: 0, win_end: 10, ..ContextSpan::new(8, 8, 1) });
        assert_eq!(consider(&mut table, "bNEG", termination(2), 4, 5), Decision::Replaced);
        assert_eq!(table.get("bNEG").map(|s| s.win_end), Some(4));

        let mut table = MatchTable::new();
        table.insert("bNEG", ContextSpan { win_end: 3, ..ContextSpan::new(9, 9, 1) });
        consider(&mut table, "bNEG", termination(2), 4, 5);
        assert_eq!(table.get("bNEG").map(|s| s.win_end), Some(3));
    }

    #[test]
    fn undirected_determinant_takes_latest_span() {
        let mut table = MatchTable::new();
        consider(&mut table, "NEG", trigger(1), 0, 3);
        assert_eq!(consider(&mut table, "NEG", trigger(2), 1, 2), Decision::Replaced);
        let span = table.get("NEG").unwrap();
        assert_eq!((span.begin, span.end, span.win_begin, span.win_end), (1, 1, 1, 1));
    }
}
