//! Router assembly and the serve loop.

use askdb_core::AuthConfig;
use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::ApiKeyLayer;
use crate::routes;
use crate::{AppState, Result};

/// Build the backend router.
///
/// `/ask` sits behind the API-key check; `/health` is open. CORS allows any
/// origin so a browser frontend on another port can call the backend.
pub fn router(state: AppState, auth: &AuthConfig) -> Router {
    let protected = Router::new()
        .route("/ask", post(routes::ask))
        .route_layer(ApiKeyLayer::new(auth));

    Router::new()
        .merge(protected)
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "askdb backend listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("askdb backend stopped");
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::routes::HealthResponse;
    use askdb_core::{QueryConfig, SqlGenerator, StaticDatabase};
    use axum::body::Body;
    use http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(auth: &AuthConfig) -> Router {
        let state = AppState::new(
            Arc::new(StaticDatabase::new()),
            SqlGenerator::templates_only(),
            QueryConfig::default(),
        );
        router(state, auth)
    }

    fn locked() -> AuthConfig {
        AuthConfig {
            api_key: Some("s3cret".to_string()),
        }
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let req = Request::get("/health").body(Body::empty()).unwrap();
        let resp = app(&locked()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.name, "askdb-api");
        assert!(!health.llm_configured);
    }

    #[tokio::test]
    async fn test_ask_requires_key_when_configured() {
        let req = Request::post("/ask")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"question": "How many users?"}"#))
            .unwrap();
        let resp = app(&locked()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_ask_with_key() {
        let req = Request::post("/ask")
            .header("content-type", "application/json")
            .header("X-API-Key", "s3cret")
            .body(Body::from(r#"{"question": "How many users?"}"#))
            .unwrap();
        let resp = app(&locked()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_preflight_allowed() {
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/ask")
            .header("origin", "http://localhost:8501")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app(&AuthConfig::default()).oneshot(req).await.unwrap();
        assert!(resp.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let req = Request::get("/nope").body(Body::empty()).unwrap();
        let resp = app(&AuthConfig::default()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
