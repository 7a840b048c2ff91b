//! docfill HTTP server binary

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use docfill_core::Settings;
use docfill_server::{start_server, AppState};

#[derive(Parser)]
#[command(name = "docfill-server")]
#[command(author, version, about = "Serve docfill over HTTP", long_about = None)]
struct Args {
    /// Configuration file (defaults to ./docfill.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    let bind = args.bind.unwrap_or_else(|| settings.server.bind.clone());

    tracing::info!(
        store = %settings.store.root.display(),
        "starting docfill server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let state = AppState::from_settings(&settings).with_context(|| {
        format!(
            "Failed to open document store: {}",
            settings.store.root.display()
        )
    })?;

    start_server(&bind, state)
        .await
        .with_context(|| format!("Server error on {}", bind))
}
