//! Explica HTTP server
//!
//! REST API over the inference service and attribution engine:
//! classification, explanation, and taxonomy inspection.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use crate::inference::InferenceService;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Taxonomy file served by `/api/taxonomy`
    pub taxonomy_path: String,
    /// Permutation sample budget for `/api/explain`
    pub attribution_samples: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("EXPLICA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("EXPLICA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            taxonomy_path: std::env::var("EXPLICA_TAXONOMY_PATH")
                .unwrap_or_else(|_| "assets/sample_taxonomy.yaml".to_string()),
            attribution_samples: std::env::var("EXPLICA_ATTRIBUTION_SAMPLES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(32),
        }
    }
}

/// Start the server over an already-constructed inference service
pub async fn run_server(config: ServerConfig, service: Arc<InferenceService>) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config.clone(), service));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        taxonomy = %config.taxonomy_path,
        "Explica server starting"
    );
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening");

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Shutdown signal received, stopping server gracefully");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.attribution_samples, 32);
    }
}
