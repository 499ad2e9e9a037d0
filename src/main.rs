//! Hevea ML - Main Entry Point

use clap::Parser;
use hevea_ml::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hevea_ml=info".into()),
        )
        .init();

    run(Cli::parse()).await
}
