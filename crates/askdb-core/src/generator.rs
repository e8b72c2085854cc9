//! Question → SQL pipeline.
//!
//! Templates are tried first. On a miss the schema is loaded, the model is
//! asked for a single MySQL statement, and the statement is extracted from
//! its reply. When the model is unavailable or unhelpful the configured
//! fallback query is used.

use crate::db::Database;
use crate::llm::{CompletionRequest, LlmProvider, Message};
use crate::schema::SchemaMetadata;
use crate::sql::{NO_MATCH_PREFIX, extract_sql, match_template};
use crate::{DEFAULT_FALLBACK_SQL, Result};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that converts natural language to SQL.";

const NO_MATCH_MESSAGE: &str = "-- No matching SQL found for this question.";

/// Where a statement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlSource {
    /// A built-in phrase template.
    Template,
    /// The language model.
    Llm,
    /// The configured fallback query.
    Fallback,
    /// No statement; the text is a `-- No matching SQL` message.
    NoMatch,
}

impl fmt::Display for SqlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlSource::Template => "template",
            SqlSource::Llm => "llm",
            SqlSource::Fallback => "fallback",
            SqlSource::NoMatch => "no_match",
        };
        f.write_str(name)
    }
}

/// Generated SQL and its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSql {
    /// Statement text, or the no-match message.
    pub sql: String,
    /// Origin of `sql`.
    pub source: SqlSource,
}

impl GeneratedSql {
    fn new(sql: impl Into<String>, source: SqlSource) -> Self {
        Self {
            sql: sql.into(),
            source,
        }
    }

    /// Whether there is a statement to execute.
    pub fn is_executable(&self) -> bool {
        self.source != SqlSource::NoMatch
    }
}

/// Turns questions into SQL.
#[derive(Clone)]
pub struct SqlGenerator {
    llm: Option<Arc<dyn LlmProvider>>,
    fallback_sql: Option<String>,
    max_tokens: u32,
}

impl SqlGenerator {
    /// A generator that only uses templates and the default fallback.
    pub fn templates_only() -> Self {
        Self {
            llm: None,
            fallback_sql: Some(DEFAULT_FALLBACK_SQL.to_string()),
            max_tokens: 256,
        }
    }

    /// A generator that asks `llm` when no template matches.
    pub fn with_llm(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm: Some(llm),
            ..Self::templates_only()
        }
    }

    /// Sets the fallback query; an empty string disables it.
    pub fn with_fallback_sql(mut self, sql: impl Into<String>) -> Self {
        let sql = sql.into();
        self.fallback_sql = (!sql.trim().is_empty()).then_some(sql);
        self
    }

    /// Sets the completion token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Whether a language model is configured.
    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Generate SQL for `question`, reading the schema from `db` only if needed.
    ///
    /// Errors only when the schema can't be loaded; model failures fall back.
    pub async fn generate(&self, question: &str, db: &dyn Database) -> Result<GeneratedSql> {
        if let Some(sql) = match_template(question) {
            tracing::debug!("Template matched");
            return Ok(GeneratedSql::new(sql, SqlSource::Template));
        }

        let Some(llm) = &self.llm else {
            tracing::warn!("No language model configured (set OPENAI_API_KEY); using fallback");
            return Ok(self.fallback());
        };

        let schema = db.schema().await?;
        let request = CompletionRequest::new(vec![Message::user(build_prompt(question, &schema))])
            .with_system_prompt(SYSTEM_PROMPT)
            .with_max_tokens(self.max_tokens);

        match llm.complete(request).await {
            Ok(response) => {
                tracing::info!(
                    provider = llm.name(),
                    tokens = response.tokens_used.total(),
                    "Model answered"
                );
                match extract_sql(&response.content) {
                    Some(text) if text.starts_with(NO_MATCH_PREFIX) => {
                        Ok(GeneratedSql::new(text, SqlSource::NoMatch))
                    }
                    Some(sql) => Ok(GeneratedSql::new(sql, SqlSource::Llm)),
                    None => {
                        tracing::warn!("Model reply contained no SQL; using fallback");
                        Ok(self.fallback())
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "LLM generation failed; using fallback");
                Ok(self.fallback())
            }
        }
    }

    fn fallback(&self) -> GeneratedSql {
        match &self.fallback_sql {
            Some(sql) => GeneratedSql::new(sql.clone(), SqlSource::Fallback),
            None => GeneratedSql::new(NO_MATCH_MESSAGE, SqlSource::NoMatch),
        }
    }
}

/// The user prompt sent to the model.
pub fn build_prompt(question: &str, schema: &SchemaMetadata) -> String {
    format!(
        "Here is the database schema:\n\
         {schema}\n\
         Translate the following question into a single correct MySQL SELECT query.\n\
         Reply with the SQL only. If the schema cannot answer the question, reply with \
         `{NO_MATCH_PREFIX}` followed by a short reason.\n\
         Question: {question}\n\
         SQL:"
    )
}
