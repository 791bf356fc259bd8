//! Attribution engine
//!
//! Decomposes "how much did each token contribute to the likelihood of the
//! target label" into per-token scores, using only the classifier's
//! `predict` surface. One `explain` call moves through
//! tokenize → build payout → attribute → rank/truncate, and any failure
//! after tokenization is absorbed into a degraded zero-valued result:
//! explanation is best-effort and never breaks the caller.

mod masker;
mod shapley;
mod tokenize;

pub use masker::{MaskStrategy, TokenMasker};
pub use shapley::{PermutationShapley, ShapleyConfig};
pub use tokenize::{Token, TokenSource, TokenStream};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::inference::InferenceService;

/// Method name reported for successful attributions
const METHOD_PERMUTATION_SHAPLEY: &str = "permutation_shapley";
/// Method name reported for the degraded zero-valued path
const METHOD_DEGRADED: &str = "degraded_zero";

/// Bounds on the caller-supplied attribution cap
pub const MIN_ATTRIBUTION_TOKENS: usize = 5;
pub const MAX_ATTRIBUTION_TOKENS: usize = 256;
/// Default attribution cap
pub const DEFAULT_ATTRIBUTION_TOKENS: usize = 50;

/// One token's contribution to the target label's likelihood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAttribution {
    pub token: String,
    pub value: f64,
}

/// Provenance summary attached to every explanation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationSummary {
    pub num_tokens: usize,
    pub method: String,
    pub fallback: bool,
    pub error: Option<String>,
}

/// Result of one `explain` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationResult {
    pub input_text: String,
    pub target_label: String,
    pub attributions: Vec<TokenAttribution>,
    pub summary: ExplanationSummary,
}

/// Which scalar the payout function measures.
///
/// The indicator is the default: the adapter's public contract only
/// guarantees a ranked label list, so the payout asks "is the target still
/// the top prediction". `LabelScore` substitutes the classifier's raw score
/// for the target label when a continuous signal is wanted; the estimator
/// is agnostic to which is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMode {
    TopLabelIndicator,
    LabelScore,
}

/// Attribution engine over an [`InferenceService`]
pub struct Explainer {
    service: Arc<InferenceService>,
    shapley: ShapleyConfig,
    strategy: MaskStrategy,
    payout_mode: PayoutMode,
}

impl Explainer {
    pub fn new(service: Arc<InferenceService>) -> Self {
        Self {
            service,
            shapley: ShapleyConfig::default(),
            strategy: MaskStrategy::default(),
            payout_mode: PayoutMode::TopLabelIndicator,
        }
    }

    /// Builder method to set the permutation sample budget
    pub fn with_samples(mut self, n_samples: usize) -> Self {
        self.shapley = self.shapley.with_n_samples(n_samples);
        self
    }

    /// Builder method to set the sampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.shapley = self.shapley.with_seed(seed);
        self
    }

    /// Builder method to evaluate samples in parallel
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.shapley = self.shapley.with_parallel(parallel);
        self
    }

    /// Builder method to set the masking strategy
    pub fn with_mask_strategy(mut self, strategy: MaskStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Builder method to set the payout mode
    pub fn with_payout_mode(mut self, mode: PayoutMode) -> Self {
        self.payout_mode = mode;
        self
    }

    /// Explain the target label's likelihood for `text`.
    ///
    /// Always returns a well-formed result for well-formed input: failures
    /// inside the attribution computation produce the degraded zero-valued
    /// result with `summary.fallback == true` and the error captured as a
    /// string. `max_tokens` is clamped into
    /// [`MIN_ATTRIBUTION_TOKENS`, `MAX_ATTRIBUTION_TOKENS`].
    pub fn explain(&self, text: &str, target_label: &str, max_tokens: usize) -> ExplanationResult {
        let cap = max_tokens.clamp(MIN_ATTRIBUTION_TOKENS, MAX_ATTRIBUTION_TOKENS);

        let stream = TokenStream::acquire(self.service.classifier_tokenizer(), text);
        debug!(
            tokens = stream.len(),
            source = ?stream.source(),
            target = target_label,
            "Tokenized input for attribution"
        );

        match self.attribute(&stream, target_label) {
            Ok(values) => {
                let attributions = rank_and_truncate(stream.tokens(), &values, cap);
                let num_tokens = attributions.len();
                ExplanationResult {
                    input_text: text.to_string(),
                    target_label: target_label.to_string(),
                    attributions,
                    summary: ExplanationSummary {
                        num_tokens,
                        method: METHOD_PERMUTATION_SHAPLEY.to_string(),
                        fallback: false,
                        error: None,
                    },
                }
            }
            Err(e) => {
                warn!(error = %e, target = target_label, "Attribution failed, returning degraded result");
                degraded_result(text, target_label, cap, e.to_string())
            }
        }
    }

    /// Run the Shapley estimation for one request
    fn attribute(&self, stream: &TokenStream, target_label: &str) -> Result<ndarray::Array1<f64>> {
        let masker = TokenMasker::new(stream.tokens().to_vec(), self.strategy.clone());
        let estimator = PermutationShapley::new(self.shapley.clone());
        let service = &self.service;

        match self.payout_mode {
            PayoutMode::TopLabelIndicator => {
                // Indicator payout: 1.0 when the target is still the top
                // prediction of the masked variant. A fidelity trade-off:
                // it measures "does masking flip the top label", not a
                // continuous score shift.
                let payout = |variant: &str| -> Result<f64> {
                    let response = service.predict(variant, 1)?;
                    Ok(if response.primary_label == target_label {
                        1.0
                    } else {
                        0.0
                    })
                };
                estimator.estimate(&masker, payout)
            }
            PayoutMode::LabelScore => {
                let payout =
                    |variant: &str| -> Result<f64> { service.label_score(variant, target_label) };
                estimator.estimate(&masker, payout)
            }
        }
    }
}

/// Sort (token, value) pairs by descending |value| and truncate.
///
/// Equal magnitudes tie-break on token position so the ordering is
/// deterministic for identical input.
fn rank_and_truncate(tokens: &[Token], values: &ndarray::Array1<f64>, cap: usize) -> Vec<TokenAttribution> {
    let mut pairs: Vec<(&Token, f64)> = tokens
        .iter()
        .zip(values.iter().copied())
        .collect();
    pairs.sort_by(|a, b| {
        b.1.abs()
            .partial_cmp(&a.1.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.index.cmp(&b.0.index))
    });
    pairs.truncate(cap);
    pairs
        .into_iter()
        .map(|(token, value)| TokenAttribution {
            token: token.text.clone(),
            value,
        })
        .collect()
}

/// The degraded result: one zero-valued attribution per whitespace token,
/// truncated to the cap.
fn degraded_result(
    text: &str,
    target_label: &str,
    cap: usize,
    error: String,
) -> ExplanationResult {
    let attributions: Vec<TokenAttribution> = text
        .split_whitespace()
        .take(cap)
        .map(|t| TokenAttribution {
            token: t.to_string(),
            value: 0.0,
        })
        .collect();
    let num_tokens = attributions.len();
    ExplanationResult {
        input_text: text.to_string(),
        target_label: target_label.to_string(),
        attributions,
        summary: ExplanationSummary {
            num_tokens,
            method: METHOD_DEGRADED.to_string(),
            fallback: true,
            error: Some(error),
        },
    }
}
