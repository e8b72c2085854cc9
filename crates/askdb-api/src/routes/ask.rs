//! `POST /ask`: question in, rows out.

use askdb_core::sql::check_read_only;
use askdb_core::{AskRequest, AskResponse, Error as CoreError, QueryId};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use crate::{AppState, Result};

/// Answer a natural-language question.
///
/// The generated statement is executed only if it passes the read-only
/// guard (unless writes are allowed). A question with no matching SQL is
/// answered with a `message`, not an error. A body that isn't a JSON
/// `{"question": ...}` object is answered with an `error`.
pub async fn ask(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>> {
    let Json(request) = payload
        .map_err(|rejection| CoreError::validation_field("question", rejection.body_text()))?;
    let id = QueryId::new();
    let question = request.question.trim();
    if question.is_empty() {
        return Err(CoreError::validation_field("question", "question must not be empty").into());
    }
    tracing::info!(query_id = %id, question, "Question received");

    let generated = state.generator.generate(question, state.db.as_ref()).await?;
    tracing::info!(query_id = %id, source = %generated.source, sql = %generated.sql, "SQL generated");

    if !generated.is_executable() {
        return Ok(Json(AskResponse::Message {
            message: generated.sql.clone(),
            sql: Some(generated.sql),
        }));
    }

    if !state.query.allow_writes {
        check_read_only(&generated.sql)?;
    }

    let rows = state
        .db
        .fetch_rows(&generated.sql, state.query.max_rows)
        .await?;
    tracing::info!(query_id = %id, rows = rows.len(), "Query executed");

    Ok(Json(AskResponse::Rows {
        result: rows,
        sql: Some(generated.sql),
    }))
}
