//! Built-in ConText rules.
//!
//! A compact English rule set covering the usual ConText categories:
//!
//! - `NEG`: negated ("denies", "no evidence of", "ruled out")
//! - `HYP`: hypothetical ("rule out", "if")
//! - `UNC`: uncertain ("possible", "probable")
//! - `HIS`: historical ("history of", "> 14 days ago")
//! - `FAM`: experienced by someone other than the patient
//!
//! Ids follow declaration order. Termination rules share the category they
//! truncate; pseudo rules share the category they shadow.

use crate::Rule;

pub(crate) fn get() -> Vec<Rule> {
    vec![
        // Negation
        context_rule! { id: 1, pattern: "no", category: "NEG", direction: Forward, window: 8 },
        context_rule! { id: 2, pattern: "denies", category: "NEG", direction: Forward, window: 8 },
        context_rule! { id: 3, pattern: "denied", category: "NEG", direction: Forward, window: 8 },
        context_rule! { id: 4, pattern: "without", category: "NEG", direction: Forward, window: 8 },
        context_rule! { id: 5, pattern: "no evidence of", category: "NEG", direction: Forward, window: 8 },
        context_rule! { id: 6, pattern: "negative for", category: "NEG", direction: Forward, window: 8 },
        context_rule! { id: 7, pattern: "free of", category: "NEG", direction: Forward, window: 8 },
        context_rule! { id: 8, pattern: "ruled out", category: "NEG", direction: Backward, window: 5 },
        context_rule! { id: 9, pattern: "is ruled out", category: "NEG", direction: Backward, window: 5 },
        context_rule! { id: 10, pattern: "not", category: "NEG", direction: Forward, window: 5 },
        context_rule! { id: 11, pattern: "absence of", category: "NEG", direction: Forward, window: 8 },
        context_rule! { id: 12, pattern: "no increase", category: "NEG", direction: Forward, kind: Pseudo },
        context_rule! { id: 13, pattern: "no change", category: "NEG", direction: Forward, kind: Pseudo },
        context_rule! { id: 14, pattern: "but", category: "NEG", direction: Forward, kind: Termination },
        context_rule! { id: 15, pattern: "however", category: "NEG", direction: Forward, kind: Termination },
        context_rule! { id: 16, pattern: r"\W+ negative", category: "NEG", direction: Backward, window: 3 },
        // Hypothetical
        context_rule! { id: 17, pattern: "rule out", category: "HYP", direction: Both, window: 5 },
        context_rule! { id: 18, pattern: "if", category: "HYP", direction: Forward, window: 8 },
        context_rule! { id: 19, pattern: "but", category: "HYP", direction: Forward, kind: Termination },
        // Uncertainty
        context_rule! { id: 20, pattern: "possible", category: "UNC", direction: Forward, window: 5 },
        context_rule! { id: 21, pattern: "probable", category: "UNC", direction: Forward, window: 5 },
        context_rule! { id: 22, pattern: r"concern for \w+", category: "UNC", direction: Forward, window: 5 },
        // Historical
        context_rule! { id: 23, pattern: "history of", category: "HIS", direction: Forward, window: 8 },
        context_rule! { id: 24, pattern: "> 14 days ago", category: "HIS", direction: Backward, window: 8 },
        context_rule! { id: 25, pattern: "> 2 weeks ago", category: "HIS", direction: Backward, window: 8 },
        context_rule! { id: 26, pattern: "> 1 years ago", category: "HIS", direction: Backward, window: 8 },
        // Experiencer
        context_rule! { id: 27, pattern: "family history of", category: "FAM", direction: Forward, window: 8 },
        context_rule! { id: 28, pattern: "mother", category: "FAM", direction: Both, window: 5 },
        context_rule! { id: 29, pattern: "father", category: "FAM", direction: Both, window: 5 },
    ]
}
