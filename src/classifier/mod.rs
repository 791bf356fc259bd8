//! Classifier adapter
//!
//! Wraps the underlying text-classification backends behind a single
//! `predict` contract:
//! - Non-empty candidate labels: zero-shot NLI scoring of each label
//! - Zero-shot failure: logged, then the fixed-label fallback classifier
//! - Empty candidate labels: straight to the fallback classifier
//!
//! Every fallback transition is an explicit branch carried in
//! [`PredictRoute`], not caught control flow. Backends that are not safe
//! for concurrent invocation are serialized through a single-flight gate.

mod hub;
mod nli;
mod sentiment;

pub use hub::{select_device, ModelFiles};
pub use nli::NliZeroShot;
pub use sentiment::SentimentClassifier;

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::Result;

/// A candidate label and its score, as returned by `predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Which backend produced a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictRoute {
    /// Candidate labels scored via NLI entailment
    ZeroShot,
    /// Fixed-label classifier; candidate labels were ignored
    Fallback,
}

/// A ranked prediction together with the route that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutedPrediction {
    pub labels: Vec<LabelScore>,
    pub route: PredictRoute,
}

/// The `predict` contract consumed by the inference service and the
/// attribution engine.
pub trait TextClassifier: Send + Sync {
    /// Score `text` against `candidate_labels`, returning labels sorted by
    /// descending score and truncated to `top_k`. With empty candidates the
    /// classifier returns its own single best label.
    fn predict(
        &self,
        text: &str,
        candidate_labels: &[String],
        top_k: usize,
    ) -> Result<Vec<LabelScore>>;

    /// Tokenizer consistent with the underlying model, when one exists.
    /// Attribution prefers this over whitespace tokenization so that token
    /// boundaries match what the model sees.
    fn tokenizer(&self) -> Option<Arc<Tokenizer>> {
        None
    }

    /// Identifier used in response metadata
    fn name(&self) -> &str {
        "text-classifier"
    }
}

/// Zero-shot scoring backend: scores arbitrary candidate labels against a
/// text via NLI entailment.
pub trait ZeroShotBackend: Send + Sync {
    fn score_labels(&self, text: &str, candidate_labels: &[String]) -> Result<Vec<LabelScore>>;

    fn name(&self) -> &str;

    fn tokenizer(&self) -> Option<Arc<Tokenizer>> {
        None
    }

    /// Whether the backend tolerates concurrent invocations
    fn concurrency_safe(&self) -> bool {
        true
    }
}

/// Fixed-label backend: classifies into its own closed label set,
/// ignoring caller-supplied candidates.
pub trait FixedLabelBackend: Send + Sync {
    fn classify(&self, text: &str) -> Result<LabelScore>;

    fn name(&self) -> &str;

    fn concurrency_safe(&self) -> bool {
        true
    }
}

/// Classifier adapter combining a zero-shot backend with a fixed-label
/// fallback.
///
/// Backends are explicitly constructed resources injected at build time;
/// initialization failure is fatal to the instance and is never retried.
pub struct ClassifierAdapter {
    zero_shot: Option<Box<dyn ZeroShotBackend>>,
    fallback: Box<dyn FixedLabelBackend>,
    /// Single-flight gate, present when any backend is not safe for
    /// concurrent invocation
    gate: Option<Mutex<()>>,
}

impl std::fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierAdapter")
            .field("zero_shot", &self.zero_shot.as_ref().map(|z| z.name()))
            .field("fallback", &self.fallback.name())
            .field("gated", &self.gate.is_some())
            .finish()
    }
}

impl ClassifierAdapter {
    /// Create an adapter with only the fixed-label fallback
    pub fn new(fallback: Box<dyn FixedLabelBackend>) -> Self {
        let gate = (!fallback.concurrency_safe()).then(|| Mutex::new(()));
        Self {
            zero_shot: None,
            fallback,
            gate,
        }
    }

    /// Attach a zero-shot backend
    pub fn with_zero_shot(mut self, backend: Box<dyn ZeroShotBackend>) -> Self {
        if !backend.concurrency_safe() {
            self.gate.get_or_insert_with(|| Mutex::new(()));
        }
        self.zero_shot = Some(backend);
        self
    }

    /// Build the production adapter from settings: NLI zero-shot plus the
    /// fixed-label sentiment fallback, both loaded eagerly. A load failure
    /// here is fatal to the adapter instance.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let device = select_device();
        let fallback = SentimentClassifier::load(&settings.fallback_model_id, device.clone())?;
        let zero_shot = NliZeroShot::load(
            &settings.model_id,
            &settings.hypothesis_template,
            device,
        )?;
        Ok(Self::new(Box::new(fallback)).with_zero_shot(Box::new(zero_shot)))
    }

    /// Predict with the route that produced the result made explicit
    pub fn predict_routed(
        &self,
        text: &str,
        candidate_labels: &[String],
        top_k: usize,
    ) -> Result<RoutedPrediction> {
        if !candidate_labels.is_empty() {
            if let Some(ref zero_shot) = self.zero_shot {
                let attempt = {
                    let _flight = self.gate.as_ref().map(|g| g.lock());
                    zero_shot.score_labels(text, candidate_labels)
                };
                match attempt {
                    Ok(mut scores) => {
                        scores.sort_by(|a, b| {
                            b.score
                                .partial_cmp(&a.score)
                                .unwrap_or(std::cmp::Ordering::Equal)
                        });
                        scores.truncate(top_k);
                        return Ok(RoutedPrediction {
                            labels: scores,
                            route: PredictRoute::ZeroShot,
                        });
                    }
                    Err(e) => {
                        warn!(
                            model = zero_shot.name(),
                            error = %e,
                            "Zero-shot scoring failed, using fixed-label fallback"
                        );
                    }
                }
            } else {
                debug!("No zero-shot backend configured, using fixed-label fallback");
            }
        }

        let best = {
            let _flight = self.gate.as_ref().map(|g| g.lock());
            self.fallback.classify(text)?
        };
        Ok(RoutedPrediction {
            labels: vec![best],
            route: PredictRoute::Fallback,
        })
    }
}

impl TextClassifier for ClassifierAdapter {
    fn predict(
        &self,
        text: &str,
        candidate_labels: &[String],
        top_k: usize,
    ) -> Result<Vec<LabelScore>> {
        Ok(self.predict_routed(text, candidate_labels, top_k)?.labels)
    }

    fn tokenizer(&self) -> Option<Arc<Tokenizer>> {
        self.zero_shot.as_ref().and_then(|z| z.tokenizer())
    }

    fn name(&self) -> &str {
        match self.zero_shot {
            Some(ref z) => z.name(),
            None => self.fallback.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExplicaError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedZeroShot {
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedZeroShot {
        fn new(fail: bool) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    fail,
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl ZeroShotBackend for ScriptedZeroShot {
        fn score_labels(
            &self,
            _text: &str,
            candidate_labels: &[String],
        ) -> Result<Vec<LabelScore>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ExplicaError::ZeroShot("scripted failure".to_string()));
            }
            // Score labels by inverse position so ordering is observable
            Ok(candidate_labels
                .iter()
                .enumerate()
                .map(|(i, label)| LabelScore {
                    label: label.clone(),
                    score: 1.0 / (i + 1) as f64,
                })
                .collect())
        }

        fn name(&self) -> &str {
            "scripted-zero-shot"
        }
    }

    struct ConstFallback;

    impl FixedLabelBackend for ConstFallback {
        fn classify(&self, _text: &str) -> Result<LabelScore> {
            Ok(LabelScore {
                label: "POSITIVE".to_string(),
                score: 0.9,
            })
        }

        fn name(&self) -> &str {
            "const-fallback"
        }
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_zero_shot_orders_and_truncates() {
        let (zero_shot, _calls) = ScriptedZeroShot::new(false);
        let adapter =
            ClassifierAdapter::new(Box::new(ConstFallback)).with_zero_shot(Box::new(zero_shot));
        let result = adapter
            .predict_routed("some text", &labels(&["a", "b", "c"]), 2)
            .unwrap();
        assert_eq!(result.route, PredictRoute::ZeroShot);
        assert_eq!(result.labels.len(), 2);
        assert!(result.labels[0].score >= result.labels[1].score);
        assert_eq!(result.labels[0].label, "a");
    }

    #[test]
    fn test_zero_shot_failure_falls_back() {
        let (zero_shot, calls) = ScriptedZeroShot::new(true);
        let adapter =
            ClassifierAdapter::new(Box::new(ConstFallback)).with_zero_shot(Box::new(zero_shot));
        let result = adapter
            .predict_routed("some text", &labels(&["a", "b"]), 5)
            .unwrap();
        assert_eq!(result.route, PredictRoute::Fallback);
        assert_eq!(result.labels.len(), 1);
        assert_eq!(result.labels[0].label, "POSITIVE");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_candidates_skip_zero_shot() {
        let (zero_shot, calls) = ScriptedZeroShot::new(false);
        let adapter =
            ClassifierAdapter::new(Box::new(ConstFallback)).with_zero_shot(Box::new(zero_shot));
        let result = adapter.predict_routed("some text", &[], 5).unwrap();
        assert_eq!(result.route, PredictRoute::Fallback);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_zero_shot_backend_uses_fallback() {
        let adapter = ClassifierAdapter::new(Box::new(ConstFallback));
        let result = adapter
            .predict_routed("text", &labels(&["a", "b"]), 3)
            .unwrap();
        assert_eq!(result.route, PredictRoute::Fallback);
    }
}
