#![doc = include_str!("../README.md")]

pub mod auth;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{ApiKeyLayer, ApiKeyService};
pub use error::{Error, Result};
pub use server::{router, serve, shutdown_signal};
pub use state::AppState;
