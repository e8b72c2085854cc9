//! CSV exports.

use askdb_core::AskResponse;
use askdb_core::dashboard::{orders_to_csv, rows_to_csv};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use http::{StatusCode, header};

use super::load_filtered;
use crate::{Result, WebState};

fn attachment(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// `GET /download/leases.csv`: the filtered records.
pub async fn leases_csv(
    State(state): State<WebState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let filtered = load_filtered(&state, &pairs).await?;
    match filtered.records {
        Ok(records) => Ok(attachment("leases.csv", orders_to_csv(&records)?)),
        Err(message) => Ok((StatusCode::BAD_REQUEST, message).into_response()),
    }
}

/// `GET /download/ai_result.csv?question=...`: the answer's rows.
pub async fn ai_result_csv(
    State(state): State<WebState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let question = pairs
        .iter()
        .find(|(k, _)| k == "question")
        .map(|(_, v)| v.trim())
        .unwrap_or("");
    if question.is_empty() {
        return Ok((StatusCode::BAD_REQUEST, "question is required").into_response());
    }

    match state.backend.ask(question).await {
        Ok(AskResponse::Rows { result, .. }) => Ok(attachment("ai_result.csv", rows_to_csv(&result)?)),
        Ok(AskResponse::Message { message, .. }) => {
            Ok((StatusCode::UNPROCESSABLE_ENTITY, message).into_response())
        }
        Ok(AskResponse::Error { error }) => Ok((StatusCode::BAD_GATEWAY, error).into_response()),
        Err(e) => Ok((StatusCode::BAD_GATEWAY, e.to_string()).into_response()),
    }
}
