#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! askdb Core Library
//!
//! Configuration, errors, language-model providers, SQL generation and
//! guarding, and MySQL access shared by the askdb backend and frontend.

pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod generator;
pub mod ids;
pub mod llm;
pub mod model;
pub mod schema;
pub mod sql;

// Re-exports for convenience
pub use config::{
    API_KEY_HEADER, AppConfig, AuthConfig, DEFAULT_FALLBACK_SQL, DatabaseConfig, LlmConfig,
    QueryConfig, ServerConfig, WebConfig,
};
pub use db::{Database, MySqlDatabase, StaticDatabase};
pub use error::{Error, Result};
pub use generator::{GeneratedSql, SqlGenerator, SqlSource};
pub use ids::QueryId;
pub use model::{AskRequest, AskResponse, Row};
pub use schema::SchemaMetadata;
