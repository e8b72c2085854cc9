//! Raw Data tab.

use axum::extract::{Query, State};
use axum::response::Html;

use super::load_filtered;
use crate::render::{self, Nav, Tab};
use crate::{Result, WebState};

/// `GET /data`
pub async fn data(
    State(state): State<WebState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>> {
    let filtered = load_filtered(&state, &pairs).await?;
    let query = filtered.params.query_string();

    let mut body = String::from("<h2>Raw Leases Data</h2>");
    match &filtered.records {
        Err(message) => body.push_str(&render::alert("warning", message)),
        Ok(records) => {
            body.push_str(&format!("<p>{} records</p>", records.len()));
            body.push_str(&render::records_table(records));
        }
    }

    let sidebar = render::filter_form("/data", &filtered.params, &filtered.categories, filtered.bounds);
    Ok(Html(render::page(
        "Raw Data",
        Some(Nav {
            active: Tab::RawData,
            query: &query,
        }),
        &format!("<main>{sidebar}<section>{body}</section></main>"),
    )))
}
