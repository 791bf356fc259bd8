//! Inference configuration

use serde::{Deserialize, Serialize};

/// Configuration for the inference service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Default number of top predictions returned
    pub top_k: usize,

    /// Maximum number of taxonomy labels offered as zero-shot candidates
    pub max_candidates: usize,

    /// Rolling window size for latency metrics
    pub metrics_window: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_candidates: 20,
            metrics_window: 1000,
        }
    }
}

impl InferenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the default top-k
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Builder method to cap candidate labels
    pub fn with_max_candidates(mut self, n: usize) -> Self {
        self.max_candidates = n.max(1);
        self
    }
}
