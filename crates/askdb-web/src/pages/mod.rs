//! Page handlers.

pub mod assistant;
pub mod data;
pub mod download;
pub mod overview;

use askdb_core::dashboard::{self, OrderRecord};
use chrono::NaiveDate;

use crate::filters::FilterParams;
use crate::{Result, WebState};

/// Records after filtering, plus what the sidebar needs.
pub(crate) struct Filtered {
    /// Filters as submitted.
    pub params: FilterParams,
    /// Every category in the dataset.
    pub categories: Vec<String>,
    /// Dataset date bounds.
    pub bounds: Option<(NaiveDate, NaiveDate)>,
    /// Passing records, or the validation message when the filter is invalid.
    pub records: std::result::Result<Vec<OrderRecord>, String>,
}

/// Load (cached) records and apply the query-string filters.
pub(crate) async fn load_filtered(state: &WebState, pairs: &[(String, String)]) -> Result<Filtered> {
    let all = state.orders.get().await?;
    let params = FilterParams::from_pairs(pairs);
    let bounds = dashboard::date_bounds(&all);
    let records = params
        .to_filter(bounds)
        .apply(&all)
        .map_err(|e| match e {
            askdb_core::Error::Validation { message, .. } => message,
            other => other.to_string(),
        });
    Ok(Filtered {
        categories: dashboard::categories(&all),
        bounds,
        params,
        records,
    })
}
