//! Router assembly and the serve loop.

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::pages::{assistant, data, download, overview};
use crate::{Result, WebState};

/// Build the frontend router.
pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(overview::overview))
        .route("/assistant", get(assistant::assistant))
        .route("/data", get(data::data))
        .route("/download/leases.csv", get(download::leases_csv))
        .route("/download/ai_result.csv", get(download::ai_result_csv))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "askdb dashboard listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
