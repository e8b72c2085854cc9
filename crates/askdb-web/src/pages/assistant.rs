//! AI Assistant tab: forward a question to the backend and show the answer.

use askdb_core::AskResponse;
use askdb_core::sql::EXAMPLE_QUESTIONS;
use axum::extract::{Query, State};
use axum::response::Html;
use std::fmt::Write;

use crate::WebState;
use crate::filters::FilterParams;
use crate::render::{self, Nav, Tab, escape};

/// `GET /assistant?question=...`
pub async fn assistant(
    State(state): State<WebState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Html<String> {
    let params = FilterParams::from_pairs(&pairs);
    let query = params.query_string();
    let hidden = render::hidden_filters(&params);
    let question = pairs
        .iter()
        .find(|(k, _)| k == "question")
        .map(|(_, v)| v.trim())
        .unwrap_or("");

    let mut body = String::from("<h2>Ask AI About Your Portfolio</h2>");
    let _ = write!(
        body,
        "<form method=\"get\" action=\"/assistant\">{hidden}\
         <input type=\"text\" name=\"question\" size=\"80\" value=\"{}\" \
         placeholder=\"e.g. What is the total revenue?\"> <button type=\"submit\">Ask</button></form>",
        escape(question)
    );

    if question.is_empty() {
        body.push_str("<p>Try one of these:</p>");
        for example in EXAMPLE_QUESTIONS {
            let _ = write!(
                body,
                "<form method=\"get\" action=\"/assistant\" style=\"display:inline\">{hidden}\
                 <input type=\"hidden\" name=\"question\" value=\"{0}\">\
                 <button type=\"submit\">{0}</button></form> ",
                escape(example)
            );
        }
    } else {
        body.push_str(&answer(&state, question, &hidden).await);
    }

    Html(render::page(
        "AI Assistant",
        Some(Nav {
            active: Tab::Assistant,
            query: &query,
        }),
        &format!("<main><section>{body}</section></main>"),
    ))
}

async fn answer(state: &WebState, question: &str, hidden: &str) -> String {
    let response = match state.backend.ask(question).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Backend request failed");
            return render::alert("error", &format!("Could not reach the backend: {e}"));
        }
    };

    let mut html = String::new();
    if let Some(sql) = response.sql() {
        let _ = write!(
            html,
            "<details><summary>Generated SQL</summary><pre>{}</pre></details>",
            escape(sql)
        );
    }
    match response {
        AskResponse::Rows { result, .. } if result.is_empty() => {
            html.push_str(&render::alert("info", "No results found."));
        }
        AskResponse::Rows { result, .. } => {
            html.push_str(&render::rows_table(&result));
            let _ = write!(
                html,
                "<form method=\"get\" action=\"/download/ai_result.csv\">{hidden}\
                 <input type=\"hidden\" name=\"question\" value=\"{}\">\
                 <button type=\"submit\">Download ai_result.csv</button></form>",
                escape(question)
            );
        }
        AskResponse::Message { message, .. } => {
            html.push_str(&render::alert("warning", &message));
        }
        AskResponse::Error { error } => {
            html.push_str(&render::alert("error", &format!("Error: {error}")));
        }
    }
    html
}
