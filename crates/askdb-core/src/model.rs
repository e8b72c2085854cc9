//! Wire types shared by the backend, its client, and the frontend.

use serde::{Deserialize, Serialize};

/// One result row: column name to value, in select-list order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Body of `POST /ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    /// The natural-language question.
    pub question: String,
}

impl AskRequest {
    /// Creates a request.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// Body returned by `POST /ask`.
///
/// Exactly one of `result`, `message`, or `error` is present on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AskResponse {
    /// The query ran.
    Rows {
        /// Returned rows.
        result: Vec<Row>,
        /// The statement that produced them.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sql: Option<String>,
    },
    /// No statement could be produced for the question.
    Message {
        /// Explanation, starting with `-- No matching SQL`.
        message: String,
        /// The text the generator produced.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sql: Option<String>,
    },
    /// Something failed.
    Error {
        /// Error description.
        error: String,
    },
}

impl AskResponse {
    /// Wraps an error description.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// The SQL that was generated, if the response carries it.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Rows { sql, .. } | Self::Message { sql, .. } => sql.as_deref(),
            Self::Error { .. } => None,
        }
    }
}
