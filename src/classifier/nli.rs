//! Zero-shot classification via NLI entailment
//!
//! Candidate labels are scored by classifying (text, hypothesis) pairs with
//! an XLM-RoBERTa NLI model, where the hypothesis is the label substituted
//! into a template such as "This example is {}.". The entailment probability
//! per pair is the label's score.

use std::sync::Arc;

use candle_core::{DType, Device, Tensor, D};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{
    Config as XLMRobertaConfig, XLMRobertaForSequenceClassification,
};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer};
use tracing::info;

use crate::error::{ExplicaError, Result};

use super::{LabelScore, ModelFiles, ZeroShotBackend};

/// NLI-based zero-shot classifier
pub struct NliZeroShot {
    model: XLMRobertaForSequenceClassification,
    tokenizer: Arc<Tokenizer>,
    device: Device,
    entailment_idx: usize,
    hypothesis_template: String,
    model_id: String,
}

impl NliZeroShot {
    /// Load an NLI model from the Hugging Face Hub.
    ///
    /// Parses `id2label` from config.json to find the entailment logit
    /// index. A failure anywhere here is fatal to the backend.
    pub fn load(model_id: &str, hypothesis_template: &str, device: Device) -> Result<Self> {
        info!(model = model_id, "Loading zero-shot NLI model");
        let files = ModelFiles::fetch(model_id)?;
        Self::from_files(&files, model_id, hypothesis_template, device)
    }

    /// Construct from already-resolved model files
    pub fn from_files(
        files: &ModelFiles,
        model_id: &str,
        hypothesis_template: &str,
        device: Device,
    ) -> Result<Self> {
        let config_str = std::fs::read_to_string(&files.config_path)?;
        let config: XLMRobertaConfig = serde_json::from_str(&config_str)
            .map_err(|e| ExplicaError::ModelInit(format!("invalid NLI config: {}", e)))?;

        let config_json: serde_json::Value = serde_json::from_str(&config_str)?;
        let id2label = config_json
            .get("id2label")
            .and_then(|v| v.as_object())
            .ok_or_else(|| {
                ExplicaError::ModelInit("config.json missing id2label mapping".to_string())
            })?;
        let entailment_idx = id2label
            .iter()
            .find_map(|(k, v)| {
                let label = v.as_str()?;
                if label.eq_ignore_ascii_case("entailment") {
                    k.parse::<usize>().ok()
                } else {
                    None
                }
            })
            .ok_or_else(|| {
                ExplicaError::ModelInit("id2label has no 'entailment' label".to_string())
            })?;
        let num_labels = id2label.len();

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer_path)
            .map_err(|e| ExplicaError::ModelInit(format!("NLI tokenizer: {}", e)))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        // SAFETY: mmap'd safetensors file; safe while the file is unmodified
        // for the lifetime of the model.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&files.weights_path], DType::F32, &device)
                .map_err(|e| ExplicaError::ModelInit(format!("NLI weights: {}", e)))?
        };
        let model = XLMRobertaForSequenceClassification::new(num_labels, &config, vb)
            .map_err(|e| ExplicaError::ModelInit(format!("NLI model: {}", e)))?;

        Ok(Self {
            model,
            tokenizer: Arc::new(tokenizer),
            device,
            entailment_idx,
            hypothesis_template: hypothesis_template.to_string(),
            model_id: model_id.to_string(),
        })
    }

    fn hypothesis(&self, label: &str) -> String {
        self.hypothesis_template.replace("{}", label)
    }

    /// Entailment probability for each (text, hypothesis) pair, batched in a
    /// single forward pass.
    fn entailment_probs(&self, pairs: &[(String, String)]) -> Result<Vec<f32>> {
        let pair_refs: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(a, b)| (a.as_str(), b.as_str()))
            .collect();
        let encodings = self
            .tokenizer
            .encode_batch(pair_refs, true)
            .map_err(|e| ExplicaError::ZeroShot(format!("tokenization failed: {}", e)))?;

        let batch_size = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        let input_ids: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_ids().to_vec())
            .collect();
        let attention_mask: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_attention_mask().to_vec())
            .collect();

        let run = || -> candle_core::Result<Vec<f32>> {
            let input_ids = Tensor::from_vec(input_ids, (batch_size, max_len), &self.device)?;
            let attention_mask =
                Tensor::from_vec(attention_mask, (batch_size, max_len), &self.device)?;
            // XLM-RoBERTa does not use token_type_ids; pass zeros
            let token_type_ids = input_ids.zeros_like()?;

            let logits = self
                .model
                .forward(&input_ids, &attention_mask, &token_type_ids)?;
            let probs = candle_nn::ops::softmax(&logits, D::Minus1)?;
            let probs = probs.to_vec2::<f32>()?;
            Ok(probs
                .into_iter()
                .map(|row| row.get(self.entailment_idx).copied().unwrap_or(0.0))
                .collect())
        };
        run().map_err(|e| ExplicaError::ZeroShot(format!("NLI forward pass failed: {}", e)))
    }
}

impl ZeroShotBackend for NliZeroShot {
    fn score_labels(&self, text: &str, candidate_labels: &[String]) -> Result<Vec<LabelScore>> {
        let pairs: Vec<(String, String)> = candidate_labels
            .iter()
            .map(|label| (text.to_string(), self.hypothesis(label)))
            .collect();
        let probs = self.entailment_probs(&pairs)?;

        Ok(candidate_labels
            .iter()
            .zip(probs)
            .map(|(label, p)| LabelScore {
                label: label.clone(),
                score: p as f64,
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.model_id
    }

    fn tokenizer(&self) -> Option<Arc<Tokenizer>> {
        Some(Arc::clone(&self.tokenizer))
    }
}
