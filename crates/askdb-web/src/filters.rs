//! Sidebar filter parameters carried in the query string.
//!
//! Categories arrive either as repeated `category=` pairs (from the filter
//! form) or as one comma-separated `categories=` value (from links). Dates
//! use `mode=single&date=` or `mode=range&start=&end=`; missing dates
//! default to the dataset's bounds.

use askdb_core::dashboard::{DateFilter, OrderFilter};
use chrono::NaiveDate;

/// Which date control is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateMode {
    /// One day.
    Single,
    /// An inclusive range.
    #[default]
    Range,
}

impl DateMode {
    /// Query-string value.
    pub fn as_str(self) -> &'static str {
        match self {
            DateMode::Single => "single",
            DateMode::Range => "range",
        }
    }
}

/// Parsed filter parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    /// Selected categories; empty selects all.
    pub categories: Vec<String>,
    /// Active date control.
    pub mode: DateMode,
    /// Day for [`DateMode::Single`].
    pub date: Option<NaiveDate>,
    /// Range start.
    pub start: Option<NaiveDate>,
    /// Range end.
    pub end: Option<NaiveDate>,
}

impl FilterParams {
    /// Parse decoded query pairs; unknown keys and unparseable dates are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.trim();
            match key.as_str() {
                "category" if !value.is_empty() => push_unique(&mut params.categories, value),
                "categories" => value
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .for_each(|c| push_unique(&mut params.categories, c)),
                "mode" if value == "single" => params.mode = DateMode::Single,
                "mode" if value == "range" => params.mode = DateMode::Range,
                "date" => params.date = parse_date(value),
                "start" => params.start = parse_date(value),
                "end" => params.end = parse_date(value),
                _ => {}
            }
        }
        params
    }

    /// The filter to apply, with missing dates taken from `bounds`.
    pub fn to_filter(&self, bounds: Option<(NaiveDate, NaiveDate)>) -> OrderFilter {
        let dates = match self.mode {
            DateMode::Single => self
                .date
                .or(bounds.map(|(first, _)| first))
                .map(DateFilter::Single),
            DateMode::Range => {
                let start = self.start.or(bounds.map(|(first, _)| first));
                let end = self.end.or(bounds.map(|(_, last)| last));
                match (start, end) {
                    (Some(start), Some(end)) => Some(DateFilter::Range { start, end }),
                    _ => None,
                }
            }
        };
        OrderFilter {
            categories: self.categories.clone(),
            dates,
        }
    }

    /// Encode back into a query string (without the leading `?`).
    pub fn query_string(&self) -> String {
        let mut parts = Vec::new();
        if !self.categories.is_empty() {
            parts.push(format!(
                "categories={}",
                urlencoding::encode(&self.categories.join(","))
            ));
        }
        parts.push(format!("mode={}", self.mode.as_str()));
        for (key, value) in [("date", self.date), ("start", self.start), ("end", self.end)] {
            if let Some(day) = value {
                parts.push(format!("{key}={day}"));
            }
        }
        parts.join("&")
    }
}

fn push_unique(categories: &mut Vec<String>, category: &str) {
    if !categories.iter().any(|c| c == category) {
        categories.push(category.to_string());
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(day) => Some(day),
        Err(e) => {
            tracing::debug!(value, error = %e, "Ignoring unparseable date");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_repeated_and_comma_categories_merge() {
        let params = FilterParams::from_pairs(&pairs(&[
            ("category", "Studio"),
            ("categories", "Bedsitter, Studio,,Penthouse"),
        ]));
        assert_eq!(params.categories, ["Studio", "Bedsitter", "Penthouse"]);
    }

    #[test]
    fn test_empty_and_bad_dates_ignored() {
        let params = FilterParams::from_pairs(&pairs(&[
            ("start", ""),
            ("end", "not-a-date"),
            ("date", "2024-03-05"),
        ]));
        assert_eq!(params.start, None);
        assert_eq!(params.end, None);
        assert_eq!(params.date, Some(day(5)));
    }

    #[test]
    fn test_range_defaults_to_bounds() {
        let params = FilterParams {
            start: Some(day(3)),
            ..FilterParams::default()
        };
        let filter = params.to_filter(Some((day(1), day(9))));
        assert_eq!(
            filter.dates,
            Some(DateFilter::Range {
                start: day(3),
                end: day(9)
            })
        );
    }

    #[test]
    fn test_single_defaults_to_first_day() {
        let params = FilterParams::from_pairs(&pairs(&[("mode", "single")]));
        let filter = params.to_filter(Some((day(2), day(9))));
        assert_eq!(filter.dates, Some(DateFilter::Single(day(2))));
    }

    #[test]
    fn test_first_visit_covers_whole_dataset() {
        let params = FilterParams::from_pairs(&[]);
        assert_eq!(params.mode, DateMode::Range);
        assert!(params.categories.is_empty());

        let filter = params.to_filter(Some((day(1), day(9))));
        assert!(filter.categories.is_empty());
        assert_eq!(
            filter.dates,
            Some(DateFilter::Range {
                start: day(1),
                end: day(9)
            })
        );
    }

    #[test]
    fn test_no_data_no_date_filter() {
        let filter = FilterParams::default().to_filter(None);
        assert_eq!(filter.dates, None);
    }

    #[test]
    fn test_query_string_round_trips() {
        let params = FilterParams {
            categories: vec!["Two Bedroom".to_string(), "Studio".to_string()],
            mode: DateMode::Range,
            date: None,
            start: Some(day(1)),
            end: Some(day(4)),
        };
        let query = params.query_string();
        assert_eq!(
            query,
            "categories=Two%20Bedroom%2CStudio&mode=range&start=2024-03-01&end=2024-03-04"
        );

        let decoded: Vec<(String, String)> = query
            .split('&')
            .filter_map(|kv| kv.split_once('='))
            .map(|(k, v)| (k.to_string(), urlencoding::decode(v).unwrap().into_owned()))
            .collect();
        assert_eq!(FilterParams::from_pairs(&decoded), params);
    }
}
