//! Error types for askdb-client

use thiserror::Error;

/// Result type alias for askdb-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the backend
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Transport failure or unreadable body
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the API key
    #[error("Unauthorized: check API_KEY")]
    Unauthorized,

    /// Non-success status without a recognizable body
    #[error("Backend returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Body was not valid JSON of the expected shape
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client misconfiguration
    #[error("Invalid client configuration: {0}")]
    Config(String),
}
