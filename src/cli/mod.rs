//! Explica CLI module
//!
//! Command-line interface for classification, explanation, and taxonomy
//! inspection, plus the server entry point.

use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::explainability::{Explainer, DEFAULT_ATTRIBUTION_TOKENS};
use crate::inference::shared_service;
use crate::server::{run_server, ServerConfig};
use crate::taxonomy::TaxonomyLoader;

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "explica")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Transaction-text classification with token-level attribution explanations")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server
    Serve {
        /// Bind address
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Bind port
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Classify a transaction description
    Infer {
        /// Text to classify
        text: String,

        /// Number of top predictions to return
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,
    },

    /// Explain a label's likelihood with token attributions
    Explain {
        /// Text to explain
        text: String,

        /// Label to explain; defaults to the top predicted label
        #[arg(short, long)]
        label: Option<String>,

        /// Maximum number of attributions to return
        #[arg(long, default_value_t = DEFAULT_ATTRIBUTION_TOKENS)]
        max_tokens: usize,
    },

    /// Print the taxonomy's candidate labels
    Taxonomy {
        /// Taxonomy file; defaults to the configured path
        #[arg(long)]
        path: Option<String>,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

/// Start the API server
pub async fn cmd_serve(host: &str, port: u16) -> anyhow::Result<()> {
    let settings = Settings::from_env();
    let service = shared_service(&settings)?;
    let config = ServerConfig {
        host: host.to_string(),
        port,
        taxonomy_path: settings.taxonomy_path.clone(),
        attribution_samples: settings.attribution_samples,
    };
    run_server(config, service).await
}

/// Classify one text and print the ranked predictions as JSON
pub fn cmd_infer(text: &str, top_k: usize) -> anyhow::Result<()> {
    let settings = Settings::from_env();
    let service = shared_service(&settings)?;
    let response = service.predict(text, top_k)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Explain one text and print the attributions as JSON
pub fn cmd_explain(text: &str, label: Option<&str>, max_tokens: usize) -> anyhow::Result<()> {
    let settings = Settings::from_env();
    let service = shared_service(&settings)?;

    let target_label = match label {
        Some(label) => label.to_string(),
        None => service.predict(text, 1)?.primary_label,
    };

    let explainer = Explainer::new(service).with_samples(settings.attribution_samples);
    let result = explainer.explain(text, &target_label, max_tokens);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Print the taxonomy's flattened label list
pub fn cmd_taxonomy(path: Option<&str>) -> anyhow::Result<()> {
    let settings = Settings::from_env();
    let path = path.unwrap_or(&settings.taxonomy_path);
    let taxonomy = TaxonomyLoader::new(path).load()?;
    for label in taxonomy.labels() {
        println!("{}", label);
    }
    Ok(())
}
