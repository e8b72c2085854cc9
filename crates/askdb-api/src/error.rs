//! Backend error types and their HTTP mapping.

use askdb_core::AskResponse;
use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

/// Errors surfaced by the backend.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failure inside the question → rows pipeline.
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

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Status code the error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Core(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::info!(error = %self, "Request rejected");
        }
        (status, Json(AskResponse::error(self.to_string()))).into_response()
    }
}
