//! Order data behind the frontend dashboard: filtering, key metrics,
//! the daily trend, and CSV export.

use crate::model::Row;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One order joined with its product and user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order primary key.
    pub order_id: i64,
    /// Day the order was placed.
    pub order_date: NaiveDate,
    /// Units ordered.
    pub quantity: i64,
    /// Product name, if the product still exists.
    pub product_name: Option<String>,
    /// Product category.
    pub category: Option<String>,
    /// Unit price.
    pub price: Option<f64>,
    /// Ordering user's name.
    pub user_name: Option<String>,
    /// Ordering user's email.
    pub email: Option<String>,
}

impl OrderRecord {
    /// `quantity * price`; zero when the price is unknown.
    pub fn revenue(&self) -> f64 {
        self.quantity as f64 * self.price.unwrap_or(0.0)
    }
}

/// Date restriction chosen in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    /// Exactly one day.
    Single(NaiveDate),
    /// Inclusive range.
    Range {
        /// First day included.
        start: NaiveDate,
        /// Last day included.
        end: NaiveDate,
    },
}

impl DateFilter {
    /// Inclusive bounds, rejecting an inverted range.
    pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate)> {
        match *self {
            DateFilter::Single(day) => Ok((day, day)),
            DateFilter::Range { start, end } if start > end => Err(Error::validation_field(
                "start_date",
                "Start date cannot be after end date.",
            )),
            DateFilter::Range { start, end } => Ok((start, end)),
        }
    }
}

/// Category and date restrictions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Categories to keep; empty keeps every category.
    pub categories: Vec<String>,
    /// Optional date restriction.
    pub dates: Option<DateFilter>,
}

impl OrderFilter {
    /// Records passing both restrictions, in input order.
    pub fn apply(&self, records: &[OrderRecord]) -> Result<Vec<OrderRecord>> {
        let bounds = self.dates.map(|d| d.bounds()).transpose()?;
        let wanted: HashSet<&str> = self.categories.iter().map(String::as_str).collect();

        Ok(records
            .iter()
            .filter(|r| match bounds {
                Some((start, end)) => r.order_date >= start && r.order_date <= end,
                None => true,
            })
            .filter(|r| {
                wanted.is_empty()
                    || r.category
                        .as_deref()
                        .is_some_and(|c| wanted.contains(c))
            })
            .cloned()
            .collect())
    }
}

/// Headline numbers for the overview tab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Distinct orders.
    pub total_units: usize,
    /// Summed revenue.
    pub revenue: f64,
    /// Distinct named users.
    pub tenants: usize,
}

impl Metrics {
    /// Compute metrics over `records`.
    pub fn compute(records: &[OrderRecord]) -> Self {
        let orders: HashSet<i64> = records.iter().map(|r| r.order_id).collect();
        let tenants: HashSet<&str> = records
            .iter()
            .filter_map(|r| r.user_name.as_deref())
            .collect();
        Self {
            total_units: orders.len(),
            revenue: records.iter().map(OrderRecord::revenue).sum(),
            tenants: tenants.len(),
        }
    }
}

/// Distinct non-null categories in first-seen order.
pub fn categories(records: &[OrderRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|r| r.category.as_deref())
        .filter(|c| seen.insert(*c))
        .map(str::to_string)
        .collect()
}

/// Earliest and latest order dates.
pub fn date_bounds(records: &[OrderRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let min = records.iter().map(|r| r.order_date).min()?;
    let max = records.iter().map(|r| r.order_date).max()?;
    Some((min, max))
}

/// Orders per day, ascending by date.
pub fn daily_trend(records: &[OrderRecord]) -> Vec<(NaiveDate, usize)> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.order_date).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Format an amount as `KES 1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("KES {sign}{grouped}.{fraction}")
}

#[derive(Serialize)]
struct CsvOrder<'a> {
    order_id: i64,
    order_date: NaiveDate,
    quantity: i64,
    product_name: Option<&'a str>,
    category: Option<&'a str>,
    price: Option<f64>,
    user_name: Option<&'a str>,
    email: Option<&'a str>,
    revenue: f64,
}

/// Encode order records, with a trailing `revenue` column.
pub fn orders_to_csv(records: &[OrderRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for r in records {
        writer.serialize(CsvOrder {
            order_id: r.order_id,
            order_date: r.order_date,
            quantity: r.quantity,
            product_name: r.product_name.as_deref(),
            category: r.category.as_deref(),
            price: r.price,
            user_name: r.user_name.as_deref(),
            email: r.email.as_deref(),
            revenue: r.revenue(),
        })?;
    }
    if records.is_empty() {
        writer.write_record([
            "order_id",
            "order_date",
            "quantity",
            "product_name",
            "category",
            "price",
            "user_name",
            "email",
            "revenue",
        ])?;
    }
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Encode query rows; columns are the union of keys in first-seen order.
pub fn rows_to_csv(rows: &[Row]) -> Result<Vec<u8>> {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    if !columns.is_empty() {
        writer.write_record(&columns)?;
    }
    for row in rows {
        writer.write_record(columns.iter().map(|c| cell_text(row.get(*c))))?;
    }
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Display text for a JSON cell: strings unquoted, null empty.
pub fn cell_text(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
