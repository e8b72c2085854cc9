//! Frontend error types.

use axum::response::{Html, IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

use crate::render;

/// Errors surfaced by the frontend.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Loading or shaping dashboard data failed.
    #[error(transparent)]
    Core(#[from] askdb_core::Error),

    /// The listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for frontend operations.
pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Page failed");
        let body = render::page(
            "Error",
            None,
            &render::alert("error", &format!("Could not load data: {self}")),
        );
        (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
    }
}
