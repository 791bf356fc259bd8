//! Process configuration
//!
//! Settings are resolved from environment variables with sensible defaults,
//! so the same binary can run locally, in CI, or in a container without a
//! config file.

/// Runtime settings shared by the CLI and server entry points
#[derive(Debug, Clone)]
pub struct Settings {
    /// Hugging Face model id for zero-shot NLI classification
    pub model_id: String,
    /// Hugging Face model id for the fixed-label fallback classifier
    pub fallback_model_id: String,
    /// Hypothesis template used for zero-shot scoring; `{}` is replaced by
    /// the candidate label
    pub hypothesis_template: String,
    /// Path to the YAML taxonomy file
    pub taxonomy_path: String,
    /// Maximum number of taxonomy labels offered as candidates
    pub max_candidates: usize,
    /// Permutation sample budget for attribution
    pub attribution_samples: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_id: std::env::var("EXPLICA_MODEL_ID")
                .unwrap_or_else(|_| "joeddav/xlm-roberta-large-xnli".to_string()),
            fallback_model_id: std::env::var("EXPLICA_FALLBACK_MODEL_ID").unwrap_or_else(|_| {
                "cardiffnlp/twitter-xlm-roberta-base-sentiment".to_string()
            }),
            hypothesis_template: std::env::var("EXPLICA_HYPOTHESIS_TEMPLATE")
                .unwrap_or_else(|_| "This example is {}.".to_string()),
            taxonomy_path: std::env::var("EXPLICA_TAXONOMY_PATH")
                .unwrap_or_else(|_| "assets/sample_taxonomy.yaml".to_string()),
            max_candidates: std::env::var("EXPLICA_MAX_CANDIDATES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            attribution_samples: std::env::var("EXPLICA_ATTRIBUTION_SAMPLES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(32),
        }
    }
}

impl Settings {
    /// Load settings from the environment
    pub fn from_env() -> Self {
        Self::default()
    }
}
