//! HTTP handlers.

pub mod ask;
pub mod health;

pub use ask::ask;
pub use health::{HealthResponse, health};
