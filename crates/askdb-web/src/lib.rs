#![doc = include_str!("../README.md")]

pub mod backend;
pub mod cache;
pub mod error;
pub mod filters;
pub mod pages;
pub mod render;
pub mod server;
pub mod state;

pub use backend::AskBackend;
pub use cache::OrderCache;
pub use error::{Error, Result};
pub use filters::FilterParams;
pub use server::{router, serve, shutdown_signal};
pub use state::WebState;
