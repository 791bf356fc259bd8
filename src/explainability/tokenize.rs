//! Tokenization for attribution
//!
//! Attribution scores are assigned to surface tokens of the input text.
//! When the classifier exposes its own tokenizer we use it, so token
//! boundaries match what the model sees; otherwise we fall back to
//! whitespace tokenization. The fallback is an explicit outcome, not an
//! error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;
use tracing::debug;

/// An atomic unit of the input text: surface form plus position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub index: usize,
}

/// How the token stream was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// The classifier's own tokenizer
    Model,
    /// Whitespace splitting
    Whitespace,
}

/// The tokenized input for one explanation request
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    source: TokenSource,
}

impl TokenStream {
    /// Tokenize `text`, preferring the model tokenizer when present.
    ///
    /// Any tokenizer failure degrades to whitespace tokenization; it is
    /// logged and reflected in [`TokenStream::source`], never surfaced.
    pub fn acquire(tokenizer: Option<Arc<Tokenizer>>, text: &str) -> Self {
        if let Some(tokenizer) = tokenizer {
            match Self::from_model_tokenizer(&tokenizer, text) {
                Ok(stream) => return stream,
                Err(reason) => {
                    debug!(reason = %reason, "Model tokenization unavailable, using whitespace");
                }
            }
        }
        Self::whitespace(text)
    }

    /// Tokenize with the model tokenizer, using offsets to recover surface
    /// substrings of the original text.
    fn from_model_tokenizer(tokenizer: &Tokenizer, text: &str) -> Result<Self, String> {
        let encoding = tokenizer
            .encode(text, false)
            .map_err(|e| e.to_string())?;

        let mut tokens = Vec::new();
        for (piece, &(start, end)) in encoding.get_tokens().iter().zip(encoding.get_offsets()) {
            if start >= end {
                continue;
            }
            // Prefer the original surface span; fall back to the piece when
            // offsets do not land on char boundaries.
            let surface = text
                .get(start..end)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .unwrap_or_else(|| piece.clone());
            let index = tokens.len();
            tokens.push(Token {
                text: surface,
                index,
            });
        }
        if tokens.is_empty() && !text.trim().is_empty() {
            return Err("tokenizer produced no tokens".to_string());
        }
        Ok(Self {
            tokens,
            source: TokenSource::Model,
        })
    }

    /// Whitespace tokenization of `text`
    pub fn whitespace(text: &str) -> Self {
        let tokens = text
            .split_whitespace()
            .enumerate()
            .map(|(index, t)| Token {
                text: t.to_string(),
                index,
            })
            .collect();
        Self {
            tokens,
            source: TokenSource::Whitespace,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn source(&self) -> TokenSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_tokenization() {
        let stream = TokenStream::whitespace("Paid $23.45 at Starbucks Seattle");
        assert_eq!(stream.len(), 5);
        assert_eq!(stream.tokens()[0].text, "Paid");
        assert_eq!(stream.tokens()[4].text, "Seattle");
        assert_eq!(stream.tokens()[4].index, 4);
        assert_eq!(stream.source(), TokenSource::Whitespace);
    }

    #[test]
    fn test_acquire_without_tokenizer_uses_whitespace() {
        let stream = TokenStream::acquire(None, "hello world");
        assert_eq!(stream.source(), TokenSource::Whitespace);
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn test_empty_text() {
        let stream = TokenStream::whitespace("   ");
        assert!(stream.is_empty());
    }
}
