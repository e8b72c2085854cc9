//! Shared fixtures for dashboard tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use askdb_client::Error as ClientError;
use askdb_core::dashboard::OrderRecord;
use askdb_core::{AskResponse, StaticDatabase};
use askdb_web::{AskBackend, WebState, router};
use async_trait::async_trait;
use axum::body::Body;
use chrono::NaiveDate;
use http::{Request, StatusCode};
use tower::ServiceExt;

/// Backend that returns one canned answer and records questions.
pub struct StubBackend {
    answer: Option<AskResponse>,
    /// Questions received, in order.
    pub asked: Mutex<Vec<String>>,
}

impl StubBackend {
    /// Always answer `answer`.
    pub fn answering(answer: AskResponse) -> Self {
        Self {
            answer: Some(answer),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Always fail as if the key were wrong.
    pub fn unauthorized() -> Self {
        Self {
            answer: None,
            asked: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AskBackend for StubBackend {
    async fn ask(&self, question: &str) -> askdb_client::Result<AskResponse> {
        self.asked.lock().unwrap().push(question.to_string());
        self.answer.clone().ok_or(ClientError::Unauthorized)
    }
}

/// March 2024.
pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

/// Four leases across two unit types and three tenants.
pub fn sample_orders() -> Vec<OrderRecord> {
    let lease = |id, d, qty, category: &str, price, user: &str| OrderRecord {
        order_id: id,
        order_date: day(d),
        quantity: qty,
        product_name: Some(format!("{category} unit")),
        category: Some(category.to_string()),
        price: Some(price),
        user_name: Some(user.to_string()),
        email: Some(format!("{}@example.com", user.to_lowercase())),
    };
    vec![
        lease(1, 1, 1, "Studio", 15000.0, "Amina"),
        lease(2, 1, 2, "Bedsitter", 8000.0, "Brian"),
        lease(3, 5, 1, "Studio", 15000.0, "Chloe"),
        lease(4, 9, 1, "Bedsitter", 8500.0, "Amina"),
    ]
}

/// Router over the sample orders and `backend`.
pub fn app(backend: Arc<StubBackend>) -> axum::Router {
    let db = StaticDatabase::new().with_orders(sample_orders());
    router(WebState::new(Arc::new(db), backend, Duration::from_secs(60)))
}

/// GET `uri`, returning status, headers, and body text.
pub async fn get(app: axum::Router, uri: &str) -> (StatusCode, http::HeaderMap, String) {
    let resp = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}
