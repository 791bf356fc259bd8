//! Explica - Main Entry Point
//!
//! Transaction-text classification with token-level attribution
//! explanations, exposed through a CLI and a REST server.

use clap::Parser;
use explica::cli::{cmd_explain, cmd_infer, cmd_serve, cmd_taxonomy, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "explica=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            cmd_serve(&host, port).await?;
        }
        Commands::Infer { text, top_k } => {
            cmd_infer(&text, top_k)?;
        }
        Commands::Explain {
            text,
            label,
            max_tokens,
        } => {
            cmd_explain(&text, label.as_deref(), max_tokens)?;
        }
        Commands::Taxonomy { path } => {
            cmd_taxonomy(path.as_deref())?;
        }
    }

    Ok(())
}
