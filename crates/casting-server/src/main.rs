use anyhow::Context;
use casting_server::{AppState, config::load_config, create_router};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "casting-server", version, about = "Casting agency HTTP API")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "CASTING_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind address, e.g. 127.0.0.1:8080
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut cfg = load_config(cli.config)?;
    if let Some(bind) = cli.bind {
        cfg.server.bind = bind;
    }
    cfg.validate().context("invalid configuration")?;

    let state = Arc::new(AppState::init(&cfg).await?);
    let app = create_router(state);

    let addr = cfg.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(address = %addr, "casting-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("casting-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
