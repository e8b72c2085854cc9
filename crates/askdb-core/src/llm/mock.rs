//! Scripted provider for tests and offline runs.

use super::{CompletionRequest, CompletionResponse, LlmProvider, TokenUsage};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns scripted responses in order; the last one repeats.
///
/// Every request is recorded so tests can inspect the prompt.
pub struct MockLlmProvider {
    responses: Vec<String>,
    index: AtomicUsize,
    failures_remaining: AtomicUsize,
    always_fail: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmProvider {
    /// Creates a mock that answers with `responses` in order.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            index: AtomicUsize::new(0),
            failures_remaining: AtomicUsize::new(0),
            always_fail: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock that always answers with `response`.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Creates a mock whose every call fails with a retryable error.
    pub fn failing(message: impl Into<String>) -> Self {
        let mut mock = Self::new(Vec::new());
        mock.always_fail = Some(message.into());
        mock
    }

    /// Creates a mock that fails `failures` times before answering.
    pub fn flaky(failures: usize, response: impl Into<String>) -> Self {
        let mock = Self::with_response(response);
        mock.failures_remaining.store(failures, Ordering::SeqCst);
        mock
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.recorded().len()
    }

    /// All requests received so far.
    pub fn recorded(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn record(&self, request: CompletionRequest) {
        match self.requests.lock() {
            Ok(mut r) => r.push(request),
            Err(poisoned) => poisoned.into_inner().push(request),
        }
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.record(request);

        if let Some(message) = &self.always_fail {
            return Err(Error::llm(message.clone()));
        }

        let failed = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(Error::llm("mock transient failure"));
        }

        let i = self.index.fetch_add(1, Ordering::SeqCst);
        let content = self
            .responses
            .get(i)
            .or_else(|| self.responses.last())
            .cloned()
            .ok_or_else(|| Error::llm("mock has no scripted responses"))?;

        Ok(CompletionResponse {
            tokens_used: TokenUsage {
                input: 10,
                output: content.split_whitespace().count() as u32,
            },
            content,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::llm::Message;

    fn request() -> CompletionRequest {
        CompletionRequest::new(vec![Message::user("question")])
    }

    #[tokio::test]
    async fn test_responses_in_order_then_last_repeats() {
        let mock = MockLlmProvider::new(vec!["one".to_string(), "two".to_string()]);
        assert_eq!(mock.complete(request()).await.unwrap().content, "one");
        assert_eq!(mock.complete(request()).await.unwrap().content, "two");
        assert_eq!(mock.complete(request()).await.unwrap().content, "two");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let mock = MockLlmProvider::failing("down");
        let err = mock.complete(request()).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_flaky_mock_recovers() {
        let mock = MockLlmProvider::flaky(2, "ok");
        assert!(mock.complete(request()).await.is_err());
        assert!(mock.complete(request()).await.is_err());
        assert_eq!(mock.complete(request()).await.unwrap().content, "ok");
    }

    #[tokio::test]
    async fn test_empty_script_is_error() {
        let mock = MockLlmProvider::new(Vec::new());
        assert!(mock.complete(request()).await.is_err());
    }
}
