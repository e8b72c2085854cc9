//! askdb dashboard entry point.

use std::path::PathBuf;

use anyhow::Context;
use askdb_core::AppConfig;
use askdb_web::{Error, WebState, router, serve, shutdown_signal};
use clap::Parser;
use tokio::net::TcpListener;

/// Dashboard and question box for an askdb backend.
#[derive(Debug, Parser)]
#[command(name = "askdb-web", version, about)]
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

    /// Backend base URL (overrides config).
    #[arg(long)]
    backend_url: Option<String>,
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
        config.web.host = host;
    }
    if let Some(port) = args.port {
        config.web.port = port;
    }
    if let Some(url) = args.backend_url {
        config.web.backend_url = url;
    }

    let state = WebState::from_config(&config)?;

    let addr = format!("{}:{}", config.web.host, config.web.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| Error::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!("Open http://{addr} in a browser");

    serve(listener, router(state), shutdown_signal()).await?;
    Ok(())
}
