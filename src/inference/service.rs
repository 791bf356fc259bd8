//! Inference service implementation

use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::classifier::{ClassifierAdapter, LabelScore, TextClassifier};
use crate::config::Settings;
use crate::error::{ExplicaError, Result};
use crate::monitoring::PerformanceMetrics;
use crate::preprocessing::normalize_text;
use crate::taxonomy::TaxonomyLoader;

use super::InferenceConfig;

/// A single ranked prediction
pub type Prediction = LabelScore;

/// Response returned by [`InferenceService::predict`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub input_text: String,
    pub top_predictions: Vec<Prediction>,
    pub primary_label: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Service that classifies normalized text against the taxonomy labels
pub struct InferenceService {
    classifier: Arc<dyn TextClassifier>,
    labels: Vec<String>,
    config: InferenceConfig,
    metrics: Arc<PerformanceMetrics>,
}

impl InferenceService {
    /// Build a service from a classifier and a candidate label set.
    ///
    /// Labels are resolved once here and reused for every request; an empty
    /// label set is a configuration error.
    pub fn new(
        classifier: Arc<dyn TextClassifier>,
        labels: Vec<String>,
        config: InferenceConfig,
    ) -> Result<Self> {
        if labels.is_empty() {
            return Err(ExplicaError::Taxonomy(
                "no candidate labels configured".to_string(),
            ));
        }
        let mut labels = labels;
        labels.truncate(config.max_candidates);
        let metrics = Arc::new(PerformanceMetrics::new(config.metrics_window));
        Ok(Self {
            classifier,
            labels,
            config,
            metrics,
        })
    }

    /// Classify `text`, returning the top `top_k` predictions
    pub fn predict(&self, text: &str, top_k: usize) -> Result<InferenceResponse> {
        let start = Instant::now();
        let clean = normalize_text(text);

        let result = self.classifier.predict(&clean, &self.labels, top_k);
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        let predictions = match result {
            Ok(p) => {
                self.metrics.record_latency(latency_ms);
                p
            }
            Err(e) => {
                self.metrics.record_error();
                return Err(e);
            }
        };

        let primary_label = predictions
            .first()
            .map(|p| p.label.clone())
            .unwrap_or_else(|| "UNKNOWN".to_string());
        debug!(primary = %primary_label, latency_ms, "Prediction complete");

        let mut metadata = serde_json::Map::new();
        metadata.insert(
            "model".to_string(),
            serde_json::Value::String(self.classifier.name().to_string()),
        );
        metadata.insert("num_labels".to_string(), self.labels.len().into());

        Ok(InferenceResponse {
            input_text: text.to_string(),
            top_predictions: predictions,
            primary_label,
            metadata,
        })
    }

    /// Score a single label against the text.
    ///
    /// Used by the attribution engine's continuous-payout mode; the score is
    /// the classifier's raw score for that one candidate.
    pub fn label_score(&self, text: &str, label: &str) -> Result<f64> {
        let clean = normalize_text(text);
        let candidates = [label.to_string()];
        let scores = self.classifier.predict(&clean, &candidates, 1)?;
        scores
            .first()
            .map(|s| s.score)
            .ok_or_else(|| ExplicaError::Inference("classifier returned no score".to_string()))
    }

    /// Tokenizer consistent with the underlying classifier, if any
    pub fn classifier_tokenizer(&self) -> Option<Arc<Tokenizer>> {
        self.classifier.tokenizer()
    }

    /// Candidate labels in use
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Default top-k from configuration
    pub fn default_top_k(&self) -> usize {
        self.config.top_k
    }

    /// Latency/throughput metrics for this service
    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }
}

static SHARED: OnceCell<Arc<InferenceService>> = OnceCell::new();

/// Process-wide inference service, built once from settings.
///
/// First use pays the model-loading cost; concurrent first requests cannot
/// double-initialize because construction happens under the cell's lock.
pub fn shared_service(settings: &Settings) -> Result<Arc<InferenceService>> {
    SHARED
        .get_or_try_init(|| {
            info!("Initializing shared inference service");
            let adapter = ClassifierAdapter::from_settings(settings)?;
            let taxonomy = TaxonomyLoader::new(&settings.taxonomy_path).load()?;
            let config = InferenceConfig::new().with_max_candidates(settings.max_candidates);
            let service = InferenceService::new(Arc::new(adapter), taxonomy.labels(), config)?;
            Ok(Arc::new(service))
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FirstLabelClassifier;

    impl TextClassifier for FirstLabelClassifier {
        fn predict(
            &self,
            _text: &str,
            candidate_labels: &[String],
            top_k: usize,
        ) -> Result<Vec<LabelScore>> {
            Ok(candidate_labels
                .iter()
                .take(top_k)
                .enumerate()
                .map(|(i, label)| LabelScore {
                    label: label.clone(),
                    score: 1.0 - 0.1 * i as f64,
                })
                .collect())
        }

        fn name(&self) -> &str {
            "first-label"
        }
    }

    fn service() -> InferenceService {
        InferenceService::new(
            Arc::new(FirstLabelClassifier),
            vec!["Food & Drink".to_string(), "Shopping".to_string()],
            InferenceConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_predict_primary_label() {
        let svc = service();
        let resp = svc.predict("Paid $23.45 at Starbucks", 2).unwrap();
        assert_eq!(resp.primary_label, "Food & Drink");
        assert_eq!(resp.top_predictions.len(), 2);
        assert_eq!(resp.input_text, "Paid $23.45 at Starbucks");
        assert_eq!(
            resp.metadata.get("model").and_then(|v| v.as_str()),
            Some("first-label")
        );
    }

    #[test]
    fn test_empty_labels_rejected() {
        let result = InferenceService::new(
            Arc::new(FirstLabelClassifier),
            vec![],
            InferenceConfig::default(),
        );
        assert!(matches!(result, Err(ExplicaError::Taxonomy(_))));
    }

    #[test]
    fn test_label_cap_applied() {
        let labels: Vec<String> = (0..50).map(|i| format!("label-{}", i)).collect();
        let svc = InferenceService::new(
            Arc::new(FirstLabelClassifier),
            labels,
            InferenceConfig::new().with_max_candidates(10),
        )
        .unwrap();
        assert_eq!(svc.labels().len(), 10);
    }

    #[test]
    fn test_label_score() {
        let svc = service();
        let score = svc.label_score("some text", "Food & Drink").unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_recorded() {
        let svc = service();
        svc.predict("text", 1).unwrap();
        assert_eq!(svc.metrics().total_requests(), 1);
    }
}
