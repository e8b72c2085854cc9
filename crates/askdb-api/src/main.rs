//! askdb backend entry point.

use std::path::PathBuf;

use anyhow::Context;
use askdb_api::{AppState, Error, router, serve, shutdown_signal};
use askdb_core::AppConfig;
use clap::Parser;
use tokio::net::TcpListener;

/// Answer natural-language questions about a MySQL database.
#[derive(Debug, Parser)]
#[command(name = "askdb-api", version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long, env = "ASKDB_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config).
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,askdb=debug".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::debug!(llm = ?config.llm, query = ?config.query, "Configuration resolved");

    if !config.auth.enabled() {
        tracing::warn!("API_KEY not set; /ask accepts unauthenticated requests");
    }

    let state = AppState::from_config(&config)?;
    let app = router(state, &config.auth);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| Error::Bind {
            addr: addr.clone(),
            source,
        })?;

    serve(listener, app, shutdown_signal()).await?;
    Ok(())
}
