//! Model file resolution and device selection

use std::path::PathBuf;

use candle_core::Device;
use tracing::info;

use crate::error::{ExplicaError, Result};

/// Paths to the files a sequence-classification model needs
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub weights_path: PathBuf,
}

impl ModelFiles {
    /// Fetch model files from the Hugging Face Hub.
    ///
    /// Downloads are cached under `~/.cache/huggingface/hub/`, so repeated
    /// process starts reuse the local copies.
    pub fn fetch(repo_id: &str) -> Result<Self> {
        let api = hf_hub::api::sync::Api::new()
            .map_err(|e| ExplicaError::ModelInit(format!("hub api init failed: {}", e)))?;
        let repo = api.model(repo_id.to_string());

        let config_path = repo
            .get("config.json")
            .map_err(|e| ExplicaError::ModelInit(format!("{}: config.json: {}", repo_id, e)))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| ExplicaError::ModelInit(format!("{}: tokenizer.json: {}", repo_id, e)))?;
        let weights_path = repo.get("model.safetensors").map_err(|e| {
            ExplicaError::ModelInit(format!("{}: model.safetensors: {}", repo_id, e))
        })?;

        Ok(Self {
            config_path,
            tokenizer_path,
            weights_path,
        })
    }
}

/// Select the best available compute device.
pub fn select_device() -> Device {
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            info!("Using CUDA GPU for inference");
            return device;
        }
    }
    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            info!("Using Metal GPU for inference");
            return device;
        }
    }
    info!("Using CPU for inference");
    Device::Cpu
}
