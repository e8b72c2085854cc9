//! Shared harness for backend integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use askdb_api::{AppState, router, serve};
use askdb_core::llm::MockLlmProvider;
use askdb_core::{AuthConfig, QueryConfig, Row, SqlGenerator, StaticDatabase};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A backend running on an ephemeral port.
pub struct TestServer {
    /// Where the server listens.
    pub addr: SocketAddr,
    /// The database behind it.
    pub db: Arc<StaticDatabase>,
    /// The scripted model behind it.
    pub llm: Arc<MockLlmProvider>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a server with the given database and model script.
    pub async fn start(db: StaticDatabase, llm: MockLlmProvider, auth: AuthConfig) -> Self {
        let db = Arc::new(db);
        let llm = Arc::new(llm);
        let state = AppState::new(
            db.clone(),
            SqlGenerator::with_llm(llm.clone()),
            QueryConfig::default(),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(serve(listener, router(state, &auth), async move {
            let _ = rx.await;
        }));

        Self {
            addr,
            db,
            llm,
            shutdown: Some(tx),
        }
    }

    /// Base URL for clients.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// A row from a JSON object literal.
pub fn row(value: serde_json::Value) -> Row {
    value.as_object().cloned().unwrap()
}
