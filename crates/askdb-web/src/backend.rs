//! The frontend's view of the backend.

use askdb_client::AskClient;
use askdb_core::AskResponse;
use async_trait::async_trait;

/// Something that answers questions.
#[async_trait]
pub trait AskBackend: Send + Sync {
    /// Ask `question`; transport and auth failures are errors.
    async fn ask(&self, question: &str) -> askdb_client::Result<AskResponse>;
}

#[async_trait]
impl AskBackend for AskClient {
    async fn ask(&self, question: &str) -> askdb_client::Result<AskResponse> {
        AskClient::ask(self, question).await
    }
}
