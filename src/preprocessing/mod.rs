//! Text preprocessing
//!
//! Normalization applied to free-text transaction descriptions before they
//! reach the classifier.

mod text;

pub use text::{normalize_text, strip_punctuation};
