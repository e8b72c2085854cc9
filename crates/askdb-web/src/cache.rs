//! Time-bounded cache of the dashboard dataset.

use std::sync::Arc;
use std::time::Duration;

use askdb_core::Database;
use askdb_core::dashboard::OrderRecord;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct Cached {
    records: Arc<Vec<OrderRecord>>,
    fetched_at: Instant,
}

/// Loads order records from the database at most once per TTL.
pub struct OrderCache {
    db: Arc<dyn Database>,
    ttl: Duration,
    cached: RwLock<Option<Cached>>,
}

impl OrderCache {
    /// Create an empty cache over `db`.
    pub fn new(db: Arc<dyn Database>, ttl: Duration) -> Self {
        Self {
            db,
            ttl,
            cached: RwLock::new(None),
        }
    }

    /// Current records, reloading when missing or stale.
    pub async fn get(&self) -> askdb_core::Result<Arc<Vec<OrderRecord>>> {
        if let Some(records) = self.fresh(&*self.cached.read().await) {
            return Ok(records);
        }

        let mut slot = self.cached.write().await;
        // Another request may have reloaded while we waited for the lock.
        if let Some(records) = self.fresh(&slot) {
            return Ok(records);
        }

        let records = Arc::new(self.db.load_orders().await?);
        tracing::info!(records = records.len(), "Order data loaded");
        *slot = Some(Cached {
            records: records.clone(),
            fetched_at: Instant::now(),
        });
        Ok(records)
    }

    fn fresh(&self, cached: &Option<Cached>) -> Option<Arc<Vec<OrderRecord>>> {
        cached
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.ttl)
            .map(|c| c.records.clone())
    }
}
