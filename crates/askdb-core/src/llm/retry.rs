//! Exponential backoff around another provider.

use super::{CompletionRequest, CompletionResponse, LlmProvider};
use crate::{Error, Result};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use std::sync::Arc;
use std::time::Duration;

/// Retries retryable errors from the wrapped provider.
pub struct RetryWrapper {
    inner: Arc<dyn LlmProvider>,
    max_retries: usize,
    min_delay: Duration,
}

impl RetryWrapper {
    /// Wraps `inner` with three retries starting at 500ms.
    pub fn new(inner: Arc<dyn LlmProvider>) -> Self {
        Self {
            inner,
            max_retries: 3,
            min_delay: Duration::from_millis(500),
        }
    }

    /// Sets the retry budget.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the first backoff delay.
    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self
    }
}

#[async_trait]
impl LlmProvider for RetryWrapper {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_times(self.max_retries);

        (|| {
            let inner = Arc::clone(&self.inner);
            let request = request.clone();
            async move { inner.complete(request).await }
        })
        .retry(backoff)
        .when(Error::is_retryable)
        .notify(|err: &Error, delay: Duration| {
            tracing::warn!(
                provider = self.inner.name(),
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "Retrying completion"
            );
        })
        .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::llm::{Message, MockLlmProvider};

    fn request() -> CompletionRequest {
        CompletionRequest::new(vec![Message::user("q")])
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_failures() {
        let mock = Arc::new(MockLlmProvider::flaky(2, "SELECT 1;"));
        let wrapper = RetryWrapper::new(mock.clone()).with_min_delay(Duration::from_millis(1));

        let response = wrapper.complete(request()).await.unwrap();
        assert_eq!(response.content, "SELECT 1;");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_budget() {
        let mock = Arc::new(MockLlmProvider::failing("down"));
        let wrapper = RetryWrapper::new(mock.clone())
            .with_max_retries(2)
            .with_min_delay(Duration::from_millis(1));

        assert!(wrapper.complete(request()).await.is_err());
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_name_delegates() {
        let wrapper = RetryWrapper::new(Arc::new(MockLlmProvider::with_response("x")));
        assert_eq!(wrapper.name(), "mock");
    }
}
