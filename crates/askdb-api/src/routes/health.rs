//! Liveness probe.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"` when the server answers.
    pub status: String,
    /// Service name.
    pub name: String,
    /// Crate version.
    pub version: String,
    /// Whether non-template questions reach a language model.
    pub llm_configured: bool,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_configured: state.generator.has_llm(),
    })
}
