//! Database access.
//!
//! [`Database`] is what the backend and frontend need from MySQL: schema
//! metadata for prompts, arbitrary read queries returned as JSON rows, and
//! the joined order dataset for the dashboard. [`MySqlDatabase`] is the real
//! implementation; [`StaticDatabase`] serves canned data.

use crate::dashboard::OrderRecord;
use crate::model::Row;
use crate::schema::SchemaMetadata;
use crate::{DatabaseConfig, Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures::{Stream, TryStreamExt};
use serde_json::Value;
use sqlx::mysql::{MySql, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const SCHEMA_SQL: &str = "SELECT CAST(table_name AS CHAR) AS table_name, \
     CAST(column_name AS CHAR) AS column_name, \
     CAST(column_type AS CHAR) AS column_type \
     FROM information_schema.columns \
     WHERE table_schema = DATABASE() \
     ORDER BY table_name, ordinal_position";

/// Joined order dataset shown on the dashboard.
pub const ORDERS_SQL: &str = "SELECT o.id AS order_id, CAST(o.order_date AS DATE) AS order_date, \
     o.quantity, p.name AS product_name, p.category, p.price, \
     u.name AS user_name, u.email \
     FROM orders o \
     LEFT JOIN products p ON o.product_id = p.id \
     LEFT JOIN users u ON o.user_id = u.id";

/// What askdb needs from a database.
#[async_trait]
pub trait Database: Send + Sync {
    /// Tables and columns of the current database.
    async fn schema(&self) -> Result<SchemaMetadata>;

    /// Run `sql` and return at most `max_rows` rows.
    async fn fetch_rows(&self, sql: &str, max_rows: usize) -> Result<Vec<Row>>;

    /// The dashboard's order dataset.
    async fn load_orders(&self) -> Result<Vec<OrderRecord>> {
        let rows = self.fetch_rows(ORDERS_SQL, usize::MAX).await?;
        Ok(orders_from_rows(rows))
    }
}

/// Convert joined rows to records, skipping rows that don't fit.
pub fn orders_from_rows(rows: Vec<Row>) -> Vec<OrderRecord> {
    rows.into_iter()
        .filter_map(
            |row| match serde_json::from_value::<OrderRecord>(Value::Object(row)) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed order row");
                    None
                }
            },
        )
        .collect()
}

/// MySQL over a sqlx connection pool.
#[derive(Clone)]
pub struct MySqlDatabase {
    pool: MySqlPool,
}

impl MySqlDatabase {
    /// Build the pool without connecting; connections open on first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        let url = config.require_url()?;
        let pool = Self::pool_options(config).connect_lazy(&url)?;
        tracing::debug!(max_connections = config.max_connections, "MySQL pool created");
        Ok(Self { pool })
    }

    fn pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
        MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
    }
}

#[async_trait]
impl Database for MySqlDatabase {
    async fn schema(&self) -> Result<SchemaMetadata> {
        let rows = sqlx::query(SCHEMA_SQL).fetch_all(&self.pool).await?;
        let columns = rows
            .iter()
            .map(|row| {
                Ok((
                    row.try_get::<String, _>(0)?,
                    row.try_get::<String, _>(1)?,
                    row.try_get::<String, _>(2)?,
                ))
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;
        Ok(SchemaMetadata::from_columns(columns))
    }

    async fn fetch_rows(&self, sql: &str, max_rows: usize) -> Result<Vec<Row>> {
        // Prepared statements carry exactly one statement.
        let stream = sqlx::query(sql).persistent(false).fetch(&self.pool);
        let rows = collect_capped(stream, max_rows).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }
}

/// Drain at most `max_rows` items from `stream`, dropping it early once full.
pub async fn collect_capped<S, T, E>(
    mut stream: S,
    max_rows: usize,
) -> std::result::Result<Vec<T>, E>
where
    S: Stream<Item = std::result::Result<T, E>> + Unpin,
{
    let mut rows = Vec::new();
    while rows.len() < max_rows {
        match stream.try_next().await? {
            Some(row) => rows.push(row),
            None => return Ok(rows),
        }
    }
    tracing::debug!(max_rows, "Row limit reached");
    Ok(rows)
}

/// Convert a MySQL row to a JSON object keyed by column label.
pub fn row_to_json(row: &MySqlRow) -> Row {
    let mut out = Row::new();
    for (i, column) in row.columns().iter().enumerate() {
        out.insert(
            column.name().to_string(),
            column_value(row, i, column.type_info().name()),
        );
    }
    out
}

fn get<T>(row: &MySqlRow, i: usize) -> Option<T>
where
    T: for<'r> sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get::<T, _>(i).ok()
}

fn column_value(row: &MySqlRow, i: usize, type_name: &str) -> Value {
    match row.try_get_raw(i) {
        Ok(raw) if !raw.is_null() => {}
        _ => return Value::Null,
    }

    let value = match type_name {
        "BOOLEAN" => get::<bool>(row, i).map(Value::Bool),
        name if name.ends_with("UNSIGNED") => get::<u64>(row, i).map(Value::from),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            get::<i64>(row, i).map(Value::from)
        }
        // DECIMAL arrives as its literal digits.
        "DECIMAL" => row
            .try_get_unchecked::<String, _>(i)
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .map(float_value),
        "FLOAT" => get::<f32>(row, i).map(|f| float_value(f64::from(f))),
        "DOUBLE" => get::<f64>(row, i).map(float_value),
        "DATE" => get::<NaiveDate>(row, i).map(|d| Value::String(d.to_string())),
        "DATETIME" => get::<NaiveDateTime>(row, i).map(|d| Value::String(iso_datetime(d))),
        "TIMESTAMP" => {
            get::<DateTime<Utc>>(row, i).map(|d| Value::String(iso_datetime(d.naive_utc())))
        }
        "TIME" => get::<NaiveTime>(row, i).map(|t| Value::String(t.to_string())),
        _ => None,
    };

    value.unwrap_or_else(|| text_value(row, i))
}

fn float_value(f: f64) -> Value {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn iso_datetime(d: NaiveDateTime) -> String {
    d.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn text_value(row: &MySqlRow, i: usize) -> Value {
    if let Some(s) = get::<String>(row, i) {
        return Value::String(s);
    }
    get::<Vec<u8>>(row, i)
        .map(|bytes| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        .unwrap_or(Value::Null)
}

/// Canned data for tests and offline demos.
///
/// Queries return the rows registered for that exact statement, or the
/// default rows. Executed statements are recorded.
#[derive(Default)]
pub struct StaticDatabase {
    schema: SchemaMetadata,
    default_rows: Vec<Row>,
    results: HashMap<String, Vec<Row>>,
    orders: Vec<OrderRecord>,
    failure: Option<String>,
    executed: Mutex<Vec<String>>,
    schema_loads: AtomicUsize,
}

impl StaticDatabase {
    /// An empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the schema returned by [`Database::schema`].
    pub fn with_schema(mut self, schema: SchemaMetadata) -> Self {
        self.schema = schema;
        self
    }

    /// Rows returned for statements without a specific result.
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.default_rows = rows;
        self
    }

    /// Rows returned for exactly `sql`.
    pub fn with_result(mut self, sql: impl Into<String>, rows: Vec<Row>) -> Self {
        self.results.insert(sql.into(), rows);
        self
    }

    /// Records returned by [`Database::load_orders`].
    pub fn with_orders(mut self, orders: Vec<OrderRecord>) -> Self {
        self.orders = orders;
        self
    }

    /// Make every call fail with a database error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Statements passed to [`Database::fetch_rows`], in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|e| e.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// How many times the schema was requested.
    pub fn schema_loads(&self) -> usize {
        self.schema_loads.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(Error::Database(sqlx::Error::Protocol(message.clone()))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Database for StaticDatabase {
    async fn schema(&self) -> Result<SchemaMetadata> {
        self.schema_loads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.schema.clone())
    }

    async fn fetch_rows(&self, sql: &str, max_rows: usize) -> Result<Vec<Row>> {
        match self.executed.lock() {
            Ok(mut e) => e.push(sql.to_string()),
            Err(poisoned) => poisoned.into_inner().push(sql.to_string()),
        }
        self.check()?;
        let rows = self.results.get(sql).unwrap_or(&self.default_rows);
        Ok(rows.iter().take(max_rows).cloned().collect())
    }

    async fn load_orders(&self) -> Result<Vec<OrderRecord>> {
        self.check()?;
        Ok(self.orders.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_orders_from_rows_skips_malformed() {
        let rows = vec![
            row(json!({
                "order_id": 1, "order_date": "2024-01-02", "quantity": 2,
                "product_name": "Desk", "category": "office", "price": 99.5,
                "user_name": "alice", "email": "a@example.com"
            })),
            row(json!({"order_id": 2, "order_date": null, "quantity": 1})),
        ];
        let orders = orders_from_rows(rows);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].price, Some(99.5));
        assert_eq!(orders[0].revenue(), 199.0);
    }

    #[test]
    fn test_orders_from_rows_allows_missing_joins() {
        let rows = vec![row(json!({
            "order_id": 7, "order_date": "2024-01-02", "quantity": 1,
            "product_name": null, "category": null, "price": null,
            "user_name": null, "email": null
        }))];
        let orders = orders_from_rows(rows);
        assert_eq!(orders.len(), 1);
        assert!(orders[0].category.is_none());
    }

    #[tokio::test]
    async fn test_static_database_results() {
        let db = StaticDatabase::new()
            .with_rows(vec![row(json!({"n": 1})), row(json!({"n": 2}))])
            .with_result("SELECT 42", vec![row(json!({"answer": 42}))]);

        let specific = db.fetch_rows("SELECT 42", 10).await.unwrap();
        assert_eq!(specific[0]["answer"], 42);

        let default = db.fetch_rows("SELECT n", 1).await.unwrap();
        assert_eq!(default.len(), 1);

        assert_eq!(db.executed(), ["SELECT 42", "SELECT n"]);
    }

    #[tokio::test]
    async fn test_static_database_failure() {
        let db = StaticDatabase::new().failing("connection refused");
        let err = db.fetch_rows("SELECT 1", 10).await.unwrap_err();
        assert!(matches!(err, Error::Database(_)));
        assert!(err.to_string().contains("connection refused"));
        assert!(db.schema().await.is_err());
        assert_eq!(db.schema_loads(), 1);
    }

    #[tokio::test]
    async fn test_collect_capped_stops_at_limit() {
        let items = futures::stream::iter((0..10).map(Ok::<_, Error>));
        assert_eq!(collect_capped(items, 3).await.unwrap(), [0, 1, 2]);

        let items = futures::stream::iter((0..2).map(Ok::<_, Error>));
        assert_eq!(collect_capped(items, 3).await.unwrap(), [0, 1]);

        let items = futures::stream::iter((0..2).map(Ok::<_, Error>));
        assert!(collect_capped(items, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collect_capped_ignores_errors_past_limit() {
        let items = futures::stream::iter(vec![
            Ok(1),
            Ok(2),
            Err(Error::validation("late failure")),
        ]);
        assert_eq!(collect_capped(items, 2).await.unwrap(), [1, 2]);

        let items = futures::stream::iter(vec![Ok(1), Err(Error::validation("early failure"))]);
        assert!(collect_capped(items, 5).await.is_err());
    }

    #[test]
    fn test_float_value_rejects_nan() {
        assert_eq!(float_value(f64::NAN), Value::Null);
        assert_eq!(float_value(1.5), json!(1.5));
    }

    #[test]
    fn test_connect_lazy_requires_url() {
        assert!(MySqlDatabase::connect_lazy(&DatabaseConfig::default()).is_err());
    }
}
