//! Shared handler state.

use std::sync::Arc;

use askdb_core::llm::{LlmProvider, OpenAiProvider, RetryWrapper};
use askdb_core::{AppConfig, Database, MySqlDatabase, QueryConfig, SqlGenerator};

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Where questions are answered.
    pub db: Arc<dyn Database>,
    /// Question → SQL pipeline.
    pub generator: SqlGenerator,
    /// Execution limits.
    pub query: QueryConfig,
}

impl AppState {
    /// Assemble state from parts.
    pub fn new(db: Arc<dyn Database>, generator: SqlGenerator, query: QueryConfig) -> Self {
        Self {
            db,
            generator,
            query,
        }
    }

    /// Build the production state: a lazy MySQL pool and, when an API key
    /// is configured, an OpenAI provider with retries.
    pub fn from_config(config: &AppConfig) -> askdb_core::Result<Self> {
        let db = MySqlDatabase::connect_lazy(&config.database)?;

        let generator = match OpenAiProvider::from_config(&config.llm)? {
            Some(provider) => {
                tracing::info!(model = provider.model(), "Language model configured");
                let llm: Arc<dyn LlmProvider> = Arc::new(
                    RetryWrapper::new(Arc::new(provider)).with_max_retries(config.llm.max_retries),
                );
                SqlGenerator::with_llm(llm)
            }
            None => {
                tracing::warn!(
                    "OPENAI_API_KEY not set; only built-in question templates will be answered"
                );
                SqlGenerator::templates_only()
            }
        }
        .with_fallback_sql(config.query.fallback_sql.clone())
        .with_max_tokens(config.llm.max_tokens);

        Ok(Self::new(Arc::new(db), generator, config.query.clone()))
    }
}
