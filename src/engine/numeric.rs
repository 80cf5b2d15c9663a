//! Numeric threshold branches.
//!
//! Rule files express numeric conditions as `> N` followed by ordinary terms,
//! e.g. `> 14 days ago`. At match time a token such as `"45"` or `"30-days"` is
//! compared against every threshold child of the current node:
//!
//! ```text
//! token "30-days" ──parse──▶ value 30, suffix "days"
//!
//! node ─ > 14 ─ "days" ─ ...   30 > 14, suffix hit  -> continue
//!      ─ > 29 ─ "weeks" ─ ...  30 > 29, suffix miss -> skip
//!      ─ > 30 ─ ...            30 > 30 is false     -> skip
//! ```
//!
//! Every satisfied threshold is followed, not just the tightest one. A bare
//! number continues into the threshold node itself and lets the next token
//! match the following term; a hyphenated suffix consumes that term in the
//! same token.

use super::matcher::Walker;
use super::trie::TrieNode;

/// Parsed values are clamped here once the digit run reaches four digits.
pub(crate) const VALUE_CEILING: u32 = 1000;

/// Numeric reading of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NumericToken<'a> {
    pub value: u32,
    pub suffix: Option<&'a str>,
}

impl<'a> NumericToken<'a> {
    /// Read the leading digit run and an optional `-suffix`.
    ///
    /// Returns `None` when the token does not start with a digit.
    pub fn parse(text: &'a str) -> Option<Self> {
        let caps = regex!(r"^([0-9]+)(?:-(\w+))?").captures(text)?;
        let digits = caps.get(1)?.as_str();
        let value = if digits.len() < 4 { digits.parse().ok()? } else { VALUE_CEILING };
        let suffix = caps.get(2).map(|m| m.as_str());
        Some(NumericToken { value, suffix })
    }
}

impl Walker<'_, '_> {
    /// Follow every threshold child of `node` that the token at `pos` exceeds.
    pub(super) fn match_digits(&mut self, node: &TrieNode, begin: usize, pos: usize) {
        let tokens = self.tokens;
        let Some(numeric) = NumericToken::parse(&tokens[pos].text) else {
            return;
        };
        let trie = self.trie;

        for (&threshold, &child) in node.thresholds.range(..numeric.value) {
            match numeric.suffix {
                None => self.walk(child, begin, pos + 1),
                Some(suffix) => {
                    if let Some(next) = trie.at(child).word(suffix) {
                        self.walk(next, begin, pos + 1);
                    } else {
                        log::trace!("[digits] {} > {threshold} but suffix `{suffix}` has no branch", numeric.value);
                    }
                }
            }
            if self.exhausted() {
                return;
            }
        }
    }
}
