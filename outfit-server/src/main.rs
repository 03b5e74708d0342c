//! Binary crate for the `outfit-advisor` server.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Serving the suggestion endpoint and the static frontend

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod api;
mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,outfit_core=debug,outfit_server=debug")),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
