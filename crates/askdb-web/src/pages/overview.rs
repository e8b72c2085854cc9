//! Overview tab: key metrics and the leases trend.

use askdb_core::dashboard::{Metrics, daily_trend};
use axum::extract::{Query, State};
use axum::response::Html;

use super::load_filtered;
use crate::render::{self, Nav, Tab};
use crate::{Result, WebState};

/// `GET /`
pub async fn overview(
    State(state): State<WebState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>> {
    let filtered = load_filtered(&state, &pairs).await?;
    let query = filtered.params.query_string();

    let mut body = String::from("<h2>Portfolio Dashboard</h2>");
    match &filtered.records {
        Err(message) => body.push_str(&render::alert("warning", message)),
        Ok(records) => {
            body.push_str(&render::metrics(&Metrics::compute(records)));
            body.push_str(&render::trend_chart(&daily_trend(records)));
            body.push_str(&format!(
                "<p><a href=\"/download/leases.csv?{}\">Download leases.csv</a></p>",
                render::escape(&query)
            ));
        }
    }

    let sidebar = render::filter_form("/", &filtered.params, &filtered.categories, filtered.bounds);
    Ok(Html(render::page(
        "Overview",
        Some(Nav {
            active: Tab::Overview,
            query: &query,
        }),
        &format!("<main>{sidebar}<section>{body}</section></main>"),
    )))
}
