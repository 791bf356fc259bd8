//! Inference service
//!
//! Ties preprocessing, the taxonomy, and the classifier adapter into the
//! `predict` surface consumed by the server, the CLI, and the attribution
//! engine.

mod config;
mod service;

pub use config::InferenceConfig;
pub use service::{shared_service, InferenceService, InferenceResponse, Prediction};
