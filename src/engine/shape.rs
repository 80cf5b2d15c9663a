//! Token pre-classification.
//!
//! Before a scan, every token is classified once into a [`TokenShape`] so the
//! walker can test the uppercase-wildcard and numeric-threshold branches with
//! a bit check instead of re-inspecting the text at every trie node.
//!
//! Case-insensitive scans also lowercase the tokens here. The lowered text
//! lives in a per-call view; caller-owned tokens are never mutated. Shapes are
//! computed from the original text, so `\W+` can still match an acronym in a
//! case-insensitive scan.

use crate::Token;
use std::borrow::Cow;

bitflags::bitflags! {
    /// Coarse features of a single token.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenShape: u8 {
        /// First character is an ASCII digit: candidate for threshold branches.
        const LEADING_DIGIT = 1 << 0;
        /// Non-empty and every character is an uppercase letter.
        const ALL_UPPERCASE = 1 << 1;
    }
}

impl TokenShape {
    pub fn classify(text: &str) -> Self {
        let mut shape = TokenShape::empty();
        if text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            shape |= TokenShape::LEADING_DIGIT;
        }
        if !text.is_empty() && text.chars().all(char::is_uppercase) {
            shape |= TokenShape::ALL_UPPERCASE;
        }
        shape
    }
}

/// A token as the walker sees it.
#[derive(Debug, Clone)]
pub(crate) struct TokenView<'t> {
    pub text: Cow<'t, str>,
    pub shape: TokenShape,
}

impl<'t> TokenView<'t> {
    /// Build the per-call view. Only tokens from `start` on are lowercased:
    /// nothing before the first scan origin is ever read.
    pub fn prepare(tokens: &'t [Token], start: usize, case_insensitive: bool) -> Vec<TokenView<'t>> {
        tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                let lower = case_insensitive && i >= start && token.text.chars().any(char::is_uppercase);
                let text = if lower { Cow::Owned(token.text.to_lowercase()) } else { Cow::Borrowed(token.text.as_str()) };
                TokenView { text, shape: TokenShape::classify(&token.text) }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_digits_and_acronyms() {
        assert_eq!(TokenShape::classify("30-days"), TokenShape::LEADING_DIGIT);
        assert_eq!(TokenShape::classify("45"), TokenShape::LEADING_DIGIT);
        assert_eq!(TokenShape::classify("HIV"), TokenShape::ALL_UPPERCASE);
        assert_eq!(TokenShape::classify("HIV-1"), TokenShape::empty());
        assert_eq!(TokenShape::classify("Denies"), TokenShape::empty());
        assert_eq!(TokenShape::classify(""), TokenShape::empty());
    }

    #[test]
    fn prepare_lowercases_from_start_only() {
        let tokens = Token::from_words(&["Pt", "DENIES", "HIV"]);
        let views = TokenView::prepare(&tokens, 1, true);

        assert_eq!(views[0].text, "Pt");
        assert_eq!(views[1].text, "denies");
        assert_eq!(views[2].text, "hiv");
        assert!(views[2].shape.contains(TokenShape::ALL_UPPERCASE));
    }

    #[test]
    fn prepare_borrows_when_case_sensitive() {
        let tokens = Token::from_words(&["DENIES"]);
        let views = TokenView::prepare(&tokens, 0, false);
        assert!(matches!(views[0].text, Cow::Borrowed("DENIES")));
    }
}
