//! HTTP client for `POST /ask` and `GET /health`.

use std::time::Duration;

use askdb_core::{API_KEY_HEADER, AskRequest, AskResponse};
use http::StatusCode;
use serde::Deserialize;

use crate::{Error, Result};

/// Model calls plus query execution can be slow.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for one backend.
#[derive(Clone, Debug)]
pub struct AskClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// Body of `GET /health`, as far as the client cares.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    /// `"healthy"` when up.
    pub status: String,
    /// Backend version.
    #[serde(default)]
    pub version: String,
    /// Whether non-template questions reach a model.
    #[serde(default)]
    pub llm_configured: bool,
}

impl AskClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Self::with_http_client(http, base_url, api_key)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "backend URL must start with http:// or https://, got {base_url:?}"
            )));
        }
        Ok(Self {
            http,
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask a question.
    ///
    /// Backend-reported failures (`{"error": ...}` with a 4xx/5xx status)
    /// come back as `Ok(AskResponse::Error)` so callers can show them.
    pub async fn ask(&self, question: &str) -> Result<AskResponse> {
        let mut request = self
            .http
            .post(self.url("/ask"))
            .json(&AskRequest::new(question));
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), "Backend answered");
        decode_answer(status, &body)
    }

    /// Check that the backend is up.
    pub async fn health(&self) -> Result<Health> {
        let response = self.http.get(self.url("/health")).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn decode_answer(status: StatusCode, body: &str) -> Result<AskResponse> {
    if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
        return Err(Error::Unauthorized);
    }
    match serde_json::from_str::<AskResponse>(body) {
        Ok(answer) if status.is_success() => Ok(answer),
        Ok(answer @ AskResponse::Error { .. }) => Ok(answer),
        Ok(_) => Err(Error::Status {
            status: status.as_u16(),
            body: body.to_string(),
        }),
        Err(e) if status.is_success() => Err(Error::Decode(e)),
        Err(_) => Err(Error::Status {
            status: status.as_u16(),
            body: body.to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = AskClient::new("http://localhost:8000/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/ask"), "http://localhost:8000/ask");
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        assert!(matches!(
            AskClient::new("localhost:8000", None),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_empty_key_is_dropped() {
        let client = AskClient::new("http://localhost:8000", Some(String::new())).unwrap();
        assert!(client.api_key.is_none());
    }

    #[test]
    fn test_decode_rows() {
        let answer = decode_answer(StatusCode::OK, r#"{"result": [{"n": 1}]}"#).unwrap();
        assert!(matches!(answer, AskResponse::Rows { ref result, .. } if result.len() == 1));
    }

    #[test]
    fn test_decode_error_body_on_failure_status() {
        let answer = decode_answer(StatusCode::BAD_REQUEST, r#"{"error": "bad"}"#).unwrap();
        assert_eq!(answer, AskResponse::error("bad"));
    }

    #[test]
    fn test_decode_forbidden() {
        let err = decode_answer(StatusCode::FORBIDDEN, r#"{"detail": "Unauthorized"}"#).unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
    }

    #[test]
    fn test_decode_unexpected_failure_body() {
        let err = decode_answer(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, Error::Status { status: 502, .. }));
    }

    #[test]
    fn test_decode_garbage_success_body() {
        let err = decode_answer(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        let client = AskClient::new("http://127.0.0.1:1", None).unwrap();
        assert!(matches!(client.health().await, Err(Error::Http(_))));
    }
}
