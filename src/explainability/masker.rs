//! Token masking
//!
//! Produces perturbed variants of the input where a subset of tokens is
//! hidden. Variants are ephemeral strings consumed by the payout function
//! within a single attribution computation.

use serde::{Deserialize, Serialize};

use super::tokenize::Token;

/// How masked tokens are treated when a variant is reassembled.
///
/// The default removes masked tokens entirely, keeping variants shaped like
/// natural language for NLI scoring. `Placeholder` substitutes a fixed mask
/// string for models that expect an explicit mask token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskStrategy {
    Remove,
    Placeholder(String),
}

impl Default for MaskStrategy {
    fn default() -> Self {
        MaskStrategy::Remove
    }
}

/// Builds masked variants over a fixed token sequence
#[derive(Debug, Clone)]
pub struct TokenMasker {
    tokens: Vec<Token>,
    strategy: MaskStrategy,
}

impl TokenMasker {
    pub fn new(tokens: Vec<Token>, strategy: MaskStrategy) -> Self {
        Self { tokens, strategy }
    }

    /// Number of maskable tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Reassemble the text with only the tokens where `included[i]` is true
    /// present. `included` must have one entry per token.
    pub fn variant(&self, included: &[bool]) -> String {
        debug_assert_eq!(included.len(), self.tokens.len());
        let mut parts: Vec<&str> = Vec::with_capacity(self.tokens.len());
        for (token, keep) in self.tokens.iter().zip(included) {
            if *keep {
                parts.push(&token.text);
            } else if let MaskStrategy::Placeholder(ref mask) = self.strategy {
                parts.push(mask);
            }
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<Token> {
        words
            .iter()
            .enumerate()
            .map(|(index, w)| Token {
                text: w.to_string(),
                index,
            })
            .collect()
    }

    #[test]
    fn test_remove_strategy_drops_masked_tokens() {
        let masker = TokenMasker::new(tokens(&["paid", "at", "starbucks"]), MaskStrategy::Remove);
        assert_eq!(masker.variant(&[true, false, true]), "paid starbucks");
        assert_eq!(masker.variant(&[false, false, false]), "");
        assert_eq!(masker.variant(&[true, true, true]), "paid at starbucks");
    }

    #[test]
    fn test_placeholder_strategy_substitutes() {
        let masker = TokenMasker::new(
            tokens(&["paid", "at", "starbucks"]),
            MaskStrategy::Placeholder("[MASK]".to_string()),
        );
        assert_eq!(masker.variant(&[true, false, true]), "paid [MASK] starbucks");
    }

    #[test]
    fn test_empty_token_list() {
        let masker = TokenMasker::new(vec![], MaskStrategy::Remove);
        assert!(masker.is_empty());
        assert_eq!(masker.variant(&[]), "");
    }
}
