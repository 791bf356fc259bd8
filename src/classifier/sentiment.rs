//! Fixed-label fallback classifier
//!
//! A sequence classifier over a closed label set read from the model's
//! `id2label` mapping. Used when zero-shot scoring is unavailable or fails;
//! ignores caller-supplied candidate labels by construction.

use candle_core::{DType, Device, Tensor, D};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{
    Config as XLMRobertaConfig, XLMRobertaForSequenceClassification,
};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer};
use tracing::info;

use crate::error::{ExplicaError, Result};

use super::{FixedLabelBackend, LabelScore, ModelFiles};

/// Sentiment-style fixed-label classifier
pub struct SentimentClassifier {
    model: XLMRobertaForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
    labels: Vec<String>,
    model_id: String,
}

impl SentimentClassifier {
    /// Load the classifier from the Hugging Face Hub
    pub fn load(model_id: &str, device: Device) -> Result<Self> {
        info!(model = model_id, "Loading fixed-label fallback classifier");
        let files = ModelFiles::fetch(model_id)?;
        Self::from_files(&files, model_id, device)
    }

    /// Construct from already-resolved model files
    pub fn from_files(files: &ModelFiles, model_id: &str, device: Device) -> Result<Self> {
        let config_str = std::fs::read_to_string(&files.config_path)?;
        let config: XLMRobertaConfig = serde_json::from_str(&config_str)
            .map_err(|e| ExplicaError::ModelInit(format!("invalid classifier config: {}", e)))?;

        let config_json: serde_json::Value = serde_json::from_str(&config_str)?;
        let id2label = config_json
            .get("id2label")
            .and_then(|v| v.as_object())
            .ok_or_else(|| {
                ExplicaError::ModelInit("config.json missing id2label mapping".to_string())
            })?;

        // id2label keys are stringified indices; order labels by index
        let mut indexed: Vec<(usize, String)> = id2label
            .iter()
            .filter_map(|(k, v)| Some((k.parse::<usize>().ok()?, v.as_str()?.to_string())))
            .collect();
        indexed.sort_by_key(|(i, _)| *i);
        let labels: Vec<String> = indexed.into_iter().map(|(_, l)| l).collect();
        if labels.is_empty() {
            return Err(ExplicaError::ModelInit(
                "id2label mapping is empty".to_string(),
            ));
        }

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer_path)
            .map_err(|e| ExplicaError::ModelInit(format!("classifier tokenizer: {}", e)))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        // SAFETY: mmap'd safetensors file; safe while the file is unmodified
        // for the lifetime of the model.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&files.weights_path], DType::F32, &device)
                .map_err(|e| ExplicaError::ModelInit(format!("classifier weights: {}", e)))?
        };
        let model = XLMRobertaForSequenceClassification::new(labels.len(), &config, vb)
            .map_err(|e| ExplicaError::ModelInit(format!("classifier model: {}", e)))?;

        Ok(Self {
            model,
            tokenizer,
            device,
            labels,
            model_id: model_id.to_string(),
        })
    }
}

impl FixedLabelBackend for SentimentClassifier {
    fn classify(&self, text: &str) -> Result<LabelScore> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ExplicaError::Inference(format!("tokenization failed: {}", e)))?;

        let ids = encoding.get_ids().to_vec();
        let mask = encoding.get_attention_mask().to_vec();
        let seq_len = ids.len();

        let run = || -> candle_core::Result<Vec<f32>> {
            let input_ids = Tensor::from_vec(ids, (1, seq_len), &self.device)?;
            let attention_mask = Tensor::from_vec(mask, (1, seq_len), &self.device)?;
            let token_type_ids = input_ids.zeros_like()?;
            let logits = self
                .model
                .forward(&input_ids, &attention_mask, &token_type_ids)?;
            let probs = candle_nn::ops::softmax(&logits, D::Minus1)?;
            Ok(probs.flatten_all()?.to_vec1::<f32>()?)
        };
        let probs =
            run().map_err(|e| ExplicaError::Inference(format!("forward pass failed: {}", e)))?;

        let (best_idx, best_prob) = probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| ExplicaError::Inference("empty logits".to_string()))?;

        Ok(LabelScore {
            label: self.labels[best_idx].clone(),
            score: *best_prob as f64,
        })
    }

    fn name(&self) -> &str {
        &self.model_id
    }
}
