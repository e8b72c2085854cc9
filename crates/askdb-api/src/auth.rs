//! Shared-secret check for `/ask`.
//!
//! `ApiKeyLayer` wraps a service and rejects requests whose `X-API-Key`
//! header does not equal the configured key. With no key configured every
//! request passes.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use askdb_core::{API_KEY_HEADER, AuthConfig};
use axum::body::Body;
use axum::response::IntoResponse;
use http::{Request, StatusCode};
use tower::{Layer, Service};

/// Tower `Layer` adding the API-key check.
#[derive(Clone)]
pub struct ApiKeyLayer {
    expected: Option<Arc<str>>,
}

impl ApiKeyLayer {
    /// Create a layer from auth settings.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            expected: config.api_key.as_deref().map(Arc::from),
        }
    }
}

impl<S> Layer<S> for ApiKeyLayer {
    type Service = ApiKeyService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiKeyService {
            inner,
            expected: self.expected.clone(),
        }
    }
}

/// Tower `Service` that checks the API key before forwarding.
#[derive(Clone)]
pub struct ApiKeyService<S> {
    inner: S,
    expected: Option<Arc<str>>,
}

impl<S> Service<Request<Body>> for ApiKeyService<S>
where
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let authorized = match &self.expected {
            None => true,
            Some(expected) => {
                presented_key(&req).is_some_and(|key| keys_match(key.as_bytes(), expected.as_bytes()))
            }
        };

        Box::pin(async move {
            if !authorized {
                tracing::warn!(path = %req.uri().path(), "Rejected request with missing or wrong API key");
                return Ok(unauthorized_response());
            }
            let resp = inner
                .call(req)
                .await
                .unwrap_or_else(|infallible| match infallible {});
            Ok(resp.into_response())
        })
    }
}

fn presented_key(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
}

// Compares every byte so timing does not reveal the matching prefix.
fn keys_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// 403 with the `{"detail": "Unauthorized"}` body clients expect.
fn unauthorized_response() -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        axum::Json(serde_json::json!({ "detail": "Unauthorized" })),
    )
        .into_response()
}
