//! Shared frontend state.

use std::sync::Arc;
use std::time::Duration;

use askdb_client::AskClient;
use askdb_core::{AppConfig, Database, MySqlDatabase};

use crate::{AskBackend, OrderCache};

/// State handed to every page handler.
#[derive(Clone)]
pub struct WebState {
    /// Dashboard dataset.
    pub orders: Arc<OrderCache>,
    /// Where questions go.
    pub backend: Arc<dyn AskBackend>,
}

impl WebState {
    /// Assemble state from parts.
    pub fn new(db: Arc<dyn Database>, backend: Arc<dyn AskBackend>, cache_ttl: Duration) -> Self {
        Self {
            orders: Arc::new(OrderCache::new(db, cache_ttl)),
            backend,
        }
    }

    /// Production state: a lazy MySQL pool and an HTTP client for the backend.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let db = MySqlDatabase::connect_lazy(&config.database)?;
        let client = AskClient::new(config.web.backend_url.clone(), config.auth.api_key.clone())?;
        tracing::info!(backend = client.base_url(), "Backend client configured");
        Ok(Self::new(
            Arc::new(db),
            Arc::new(client),
            Duration::from_secs(config.web.cache_ttl_secs),
        ))
    }
}
