//! Quarto language server binary.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quarto-lsp")]
#[command(version)]
#[command(about = "Quarto language server", long_about = None)]
struct Cli {
    /// Communicate over stdio (the only transport; accepted for client compatibility)
    #[arg(long)]
    stdio: bool,

    /// Log filter, e.g. `quarto_vdoc=debug`. Overrides RUST_LOG.
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries JSON-RPC, so logs go to stderr
    let filter = match &cli.log {
        Some(directives) => tracing_subscriber::EnvFilter::try_new(directives)?,
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "quarto_lsp=info,quarto_vdoc=info".into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(stdio = cli.stdio, "Starting Quarto language server");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(quarto_lsp::run_server());

    Ok(())
}
