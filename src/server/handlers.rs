//! HTTP request handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::explainability::{
    ExplanationResult, Explainer, DEFAULT_ATTRIBUTION_TOKENS, MAX_ATTRIBUTION_TOKENS,
    MIN_ATTRIBUTION_TOKENS,
};
use crate::inference::InferenceResponse;
use crate::taxonomy::TaxonomyLoader;

use super::error::{Result, ServerError};
use super::state::AppState;

// ============================================================================
// Schemas
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
}

#[derive(Debug, Deserialize)]
pub struct InferenceRequest {
    pub text: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    5
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub text: String,
    /// Label to explain; defaults to the top predicted label
    #[serde(default)]
    pub target_label: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_max_tokens() -> usize {
    DEFAULT_ATTRIBUTION_TOKENS
}

#[derive(Debug, Serialize)]
pub struct TaxonomyResponse {
    pub labels: Vec<String>,
    pub taxonomy: serde_json::Value,
}

// ============================================================================
// Handlers
// ============================================================================

/// Service health and version
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let uptime = chrono::Utc::now().signed_duration_since(state.started_at);
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: uptime.num_seconds(),
    })
}

/// Classify a transaction description against the taxonomy
pub async fn infer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InferenceRequest>,
) -> Result<Json<InferenceResponse>> {
    if request.text.trim().is_empty() {
        return Err(ServerError::BadRequest("text must be non-empty".to_string()));
    }
    if request.top_k == 0 || request.top_k > 20 {
        return Err(ServerError::BadRequest(
            "top_k must be in [1, 20]".to_string(),
        ));
    }

    let response = state.service.predict(&request.text, request.top_k)?;
    Ok(Json(response))
}

/// Explain a label's likelihood with token-level attributions.
///
/// The attribution computation itself never fails: a degraded result with
/// `summary.fallback == true` is returned instead.
pub async fn explain(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExplainRequest>,
) -> Result<Json<ExplanationResult>> {
    if request.text.trim().is_empty() {
        return Err(ServerError::BadRequest("text must be non-empty".to_string()));
    }
    if request.max_tokens < MIN_ATTRIBUTION_TOKENS || request.max_tokens > MAX_ATTRIBUTION_TOKENS {
        return Err(ServerError::BadRequest(format!(
            "max_tokens must be in [{}, {}]",
            MIN_ATTRIBUTION_TOKENS, MAX_ATTRIBUTION_TOKENS
        )));
    }

    let target_label = match request.target_label {
        Some(label) if !label.trim().is_empty() => label,
        _ => {
            let top = state.service.predict(&request.text, 1)?;
            top.primary_label
        }
    };
    info!(target = %target_label, max_tokens = request.max_tokens, "Explain request");

    let explainer = Explainer::new(Arc::clone(&state.service))
        .with_samples(state.config.attribution_samples);
    let result = explainer.explain(&request.text, &target_label, request.max_tokens);
    Ok(Json(result))
}

/// Return the taxonomy and its flattened label list
pub async fn taxonomy(State(state): State<Arc<AppState>>) -> Result<Json<TaxonomyResponse>> {
    let loader = TaxonomyLoader::new(&state.config.taxonomy_path);
    let taxonomy = loader
        .load()
        .map_err(|e| ServerError::NotFound(e.to_string()))?;
    let labels = taxonomy.labels();
    let taxonomy = serde_json::to_value(&taxonomy)
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(Json(TaxonomyResponse { labels, taxonomy }))
}
