//! Explica - transaction-text classification with explanations
//!
//! This crate classifies free-text transaction descriptions into a
//! configurable taxonomy of categories and produces token-level attributions
//! explaining why a label was chosen.
//!
//! # Modules
//!
//! ## Core
//! - [`classifier`] - Classifier adapter: zero-shot NLI scoring with a
//!   fixed-label fallback chain
//! - [`explainability`] - Attribution engine: permutation-sampling Shapley
//!   estimation over masked text variants
//! - [`inference`] - Inference service tying preprocessing, taxonomy, and
//!   classifier together
//!
//! ## Supporting
//! - [`preprocessing`] - Text normalization
//! - [`taxonomy`] - YAML taxonomy loading
//! - [`monitoring`] - Latency and throughput metrics
//!
//! ## Services
//! - [`server`] - REST API (axum)
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Configuration
pub mod config;

// Core modules
pub mod classifier;
pub mod explainability;
pub mod inference;

// Supporting modules
pub mod monitoring;
pub mod preprocessing;
pub mod taxonomy;

// Services
pub mod cli;
pub mod server;

pub use classifier::{ClassifierAdapter, LabelScore, TextClassifier};
pub use error::{ExplicaError, Result};
pub use explainability::{ExplanationResult, Explainer};
pub use inference::{InferenceResponse, InferenceService};
