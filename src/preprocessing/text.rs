//! Text normalization helpers

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize input text for model ingestion.
///
/// Lowercases, collapses runs of whitespace to a single space, and trims
/// leading/trailing whitespace. Token-level content is preserved so that
/// attribution tokens remain recognizable substrings of the input.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    WHITESPACE_RE.replace_all(lowered.trim(), " ").into_owned()
}

/// Remove punctuation characters, keeping alphanumerics and whitespace.
pub fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect()
}
