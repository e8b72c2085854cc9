//! HTML fragments for the dashboard pages.

use std::fmt::Write;

use askdb_core::Row;
use askdb_core::dashboard::{Metrics, OrderRecord, cell_text, format_currency};
use chrono::NaiveDate;

use crate::filters::{DateMode, FilterParams};

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;color:#222;background:#fafafa}\
header{background:#1f3b57;color:#fff;padding:12px 24px}\
header h1{margin:0;font-size:1.4em}\
nav{display:flex;gap:4px;padding:0 24px;background:#e8edf2}\
nav a{padding:10px 16px;text-decoration:none;color:#1f3b57}\
nav a.active{background:#fafafa;font-weight:600}\
main{display:flex;gap:24px;padding:24px}\
aside{min-width:220px}\
section{flex:1;min-width:0}\
.metrics{display:flex;gap:16px}\
.metric{background:#fff;border:1px solid #ddd;border-radius:6px;padding:12px 16px;flex:1}\
.metric .label{font-size:.85em;color:#666}\
.metric .value{font-size:1.5em;font-weight:600}\
table{border-collapse:collapse;width:100%;background:#fff;font-size:.9em}\
th,td{border:1px solid #ddd;padding:4px 8px;text-align:left}\
th{background:#f0f3f6}\
.alert{padding:10px 14px;border-radius:6px;margin:12px 0}\
.alert.warning{background:#fff6db;border:1px solid #e6c65c}\
.alert.error{background:#fde8e8;border:1px solid #e08c8c}\
.alert.info{background:#e8f1fd;border:1px solid #8cb3e0}\
pre{background:#f0f3f6;padding:8px;overflow-x:auto}\
";

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Metrics and trend.
    Overview,
    /// Question box.
    Assistant,
    /// Record table.
    RawData,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Overview, Tab::Assistant, Tab::RawData];

    fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Assistant => "AI Assistant",
            Tab::RawData => "Raw Data",
        }
    }

    fn path(self) -> &'static str {
        match self {
            Tab::Overview => "/",
            Tab::Assistant => "/assistant",
            Tab::RawData => "/data",
        }
    }
}

/// Tab bar state: the active tab and the filter query carried between tabs.
#[derive(Debug, Clone, Copy)]
pub struct Nav<'a> {
    /// Highlighted tab.
    pub active: Tab,
    /// Query string appended to every tab link.
    pub query: &'a str,
}

/// Escape text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// A complete page.
pub fn page(title: &str, nav: Option<Nav<'_>>, body: &str) -> String {
    let mut tabs = String::new();
    if let Some(nav) = nav {
        tabs.push_str("<nav>");
        for tab in Tab::ALL {
            let class = if tab == nav.active { " class=\"active\"" } else { "" };
            let href = if nav.query.is_empty() {
                tab.path().to_string()
            } else {
                format!("{}?{}", tab.path(), nav.query)
            };
            let _ = write!(
                tabs,
                "<a href=\"{}\"{class}>{}</a>",
                escape(&href),
                tab.label()
            );
        }
        tabs.push_str("</nav>");
    }
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{} · AI Real Estate Dashboard</title><style>{STYLE}</style></head>\
         <body><header><h1>AI Real Estate Dashboard</h1></header>{tabs}{body}</body></html>",
        escape(title)
    )
}

/// A coloured notice; `kind` is `info`, `warning`, or `error`.
pub fn alert(kind: &str, message: &str) -> String {
    format!(
        "<div class=\"alert {}\">{}</div>",
        escape(kind),
        escape(message)
    )
}

/// Sidebar filter form submitting to `action`.
pub fn filter_form(
    action: &str,
    params: &FilterParams,
    categories: &[String],
    bounds: Option<(NaiveDate, NaiveDate)>,
) -> String {
    let mut html = format!(
        "<aside><h3>Filters</h3><form method=\"get\" action=\"{}\">",
        escape(action)
    );

    html.push_str("<fieldset><legend>Unit Type</legend>");
    for category in categories {
        let checked = if params.categories.contains(category) {
            " checked"
        } else {
            ""
        };
        let _ = write!(
            html,
            "<label><input type=\"checkbox\" name=\"category\" value=\"{0}\"{checked}> {0}</label><br>",
            escape(category)
        );
    }
    html.push_str("</fieldset>");

    let (min, max) = match bounds {
        Some((min, max)) => (min.to_string(), max.to_string()),
        None => (String::new(), String::new()),
    };
    let value = |day: Option<NaiveDate>, default: &str| day.map_or(default.to_string(), |d| d.to_string());
    let mode_checked = |mode: DateMode| if params.mode == mode { " checked" } else { "" };

    let _ = write!(
        html,
        "<fieldset><legend>Date Filter</legend>\
         <label><input type=\"radio\" name=\"mode\" value=\"single\"{}> Single Date</label><br>\
         <label><input type=\"radio\" name=\"mode\" value=\"range\"{}> Date Range</label><br>\
         <label>Date <input type=\"date\" name=\"date\" value=\"{}\" min=\"{min}\" max=\"{max}\"></label><br>\
         <label>Start <input type=\"date\" name=\"start\" value=\"{}\" min=\"{min}\" max=\"{max}\"></label><br>\
         <label>End <input type=\"date\" name=\"end\" value=\"{}\" min=\"{min}\" max=\"{max}\"></label>\
         </fieldset><button type=\"submit\">Apply</button></form></aside>",
        mode_checked(DateMode::Single),
        mode_checked(DateMode::Range),
        value(params.date, &min),
        value(params.start, &min),
        value(params.end, &max),
    );
    html
}

/// Hidden inputs that carry the current filters through another form.
pub fn hidden_filters(params: &FilterParams) -> String {
    let mut html = String::new();
    let mut hidden = |name: &str, value: &str| {
        let _ = write!(
            html,
            "<input type=\"hidden\" name=\"{name}\" value=\"{}\">",
            escape(value)
        );
    };
    if !params.categories.is_empty() {
        hidden("categories", &params.categories.join(","));
    }
    hidden("mode", params.mode.as_str());
    for (name, day) in [("date", params.date), ("start", params.start), ("end", params.end)] {
        if let Some(day) = day {
            hidden(name, &day.to_string());
        }
    }
    html
}

/// The three headline numbers.
pub fn metrics(metrics: &Metrics) -> String {
    format!(
        "<h3>Key Metrics</h3><div class=\"metrics\">\
         <div class=\"metric\"><div class=\"label\">Total Units</div><div class=\"value\">{}</div></div>\
         <div class=\"metric\"><div class=\"label\">Revenue</div><div class=\"value\">{}</div></div>\
         <div class=\"metric\"><div class=\"label\">Tenants</div><div class=\"value\">{}</div></div>\
         </div>",
        metrics.total_units,
        escape(&format_currency(metrics.revenue)),
        metrics.tenants
    )
}

/// Line chart of orders per day as inline SVG.
pub fn trend_chart(points: &[(NaiveDate, usize)]) -> String {
    const WIDTH: f64 = 640.0;
    const HEIGHT: f64 = 240.0;
    const PAD: f64 = 32.0;

    let mut svg = String::from("<h3>Leases Over Time</h3>");
    if points.is_empty() {
        svg.push_str(&alert("info", "No leases in the selected period."));
        return svg;
    }

    let max = points.iter().map(|(_, n)| *n).max().unwrap_or(1).max(1) as f64;
    let step = if points.len() > 1 {
        (WIDTH - 2.0 * PAD) / (points.len() - 1) as f64
    } else {
        0.0
    };
    let coords: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, (_, n))| {
            let x = PAD + step * i as f64;
            let y = HEIGHT - PAD - (*n as f64 / max) * (HEIGHT - 2.0 * PAD);
            (x, y)
        })
        .collect();

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" width=\"100%\" role=\"img\">\
         <line x1=\"{PAD}\" y1=\"{0}\" x2=\"{1}\" y2=\"{0}\" stroke=\"#999\"/>\
         <line x1=\"{PAD}\" y1=\"{PAD}\" x2=\"{PAD}\" y2=\"{0}\" stroke=\"#999\"/>",
        HEIGHT - PAD,
        WIDTH - PAD
    );
    let polyline: Vec<String> = coords.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
    let _ = write!(
        svg,
        "<polyline fill=\"none\" stroke=\"#1f77b4\" stroke-width=\"2\" points=\"{}\"/>",
        polyline.join(" ")
    );
    for ((x, y), (day, n)) in coords.iter().zip(points) {
        let _ = write!(
            svg,
            "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"3\" fill=\"#1f77b4\"><title>{day}: {n}</title></circle>"
        );
    }
    let (first, last) = (points[0].0, points[points.len() - 1].0);
    let _ = write!(
        svg,
        "<text x=\"{PAD}\" y=\"{0}\" font-size=\"11\">{first}</text>\
         <text x=\"{1}\" y=\"{0}\" font-size=\"11\" text-anchor=\"end\">{last}</text>\
         <text x=\"4\" y=\"{2}\" font-size=\"11\">{3}</text></svg>",
        HEIGHT - 8.0,
        WIDTH - PAD,
        PAD + 4.0,
        max as usize
    );
    svg
}

/// Table of order records.
pub fn records_table(records: &[OrderRecord]) -> String {
    let mut html = String::from(
        "<table><thead><tr><th>order_id</th><th>order_date</th><th>quantity</th>\
         <th>product_name</th><th>category</th><th>price</th><th>user_name</th><th>email</th>\
         </tr></thead><tbody>",
    );
    let opt = |v: Option<&str>| escape(v.unwrap_or(""));
    for r in records {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            r.order_id,
            r.order_date,
            r.quantity,
            opt(r.product_name.as_deref()),
            opt(r.category.as_deref()),
            r.price.map(|p| format!("{p:.2}")).unwrap_or_default(),
            opt(r.user_name.as_deref()),
            opt(r.email.as_deref()),
        );
    }
    html.push_str("</tbody></table>");
    html
}

/// Table of backend result rows; columns are the union of keys.
pub fn rows_table(rows: &[Row]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut html = String::from("<table><thead><tr>");
    for column in &columns {
        let _ = write!(html, "<th>{}</th>", escape(column));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for column in &columns {
            let _ = write!(html, "<td>{}</td>", escape(&cell_text(row.get(*column))));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_page_marks_active_tab_and_keeps_query() {
        let html = page(
            "Overview",
            Some(Nav {
                active: Tab::RawData,
                query: "mode=range&categories=Studio",
            }),
            "",
        );
        assert!(html.contains("<a href=\"/data?mode=range&amp;categories=Studio\" class=\"active\">Raw Data</a>"));
        assert!(html.contains("<a href=\"/assistant?mode=range&amp;categories=Studio\">AI Assistant</a>"));
    }

    #[test]
    fn test_metrics_formats_revenue() {
        let html = metrics(&Metrics {
            total_units: 3,
            revenue: 1234.5,
            tenants: 2,
        });
        assert!(html.contains("KES 1,234.50"));
        assert!(html.contains("Total Units"));
    }

    #[test]
    fn test_trend_chart_points() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let svg = trend_chart(&[(day(1), 2), (day(2), 4)]);
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("2024-03-02: 4"));
    }

    #[test]
    fn test_trend_chart_empty() {
        assert!(trend_chart(&[]).contains("No leases"));
    }

    #[test]
    fn test_rows_table_escapes_cells() {
        let row = json!({"name": "<script>", "n": null}).as_object().cloned().unwrap();
        let html = rows_table(&[row]);
        assert!(html.contains("<th>name</th><th>n</th>"));
        assert!(html.contains("<td>&lt;script&gt;</td><td></td>"));
    }

    #[test]
    fn test_hidden_filters() {
        let params = FilterParams {
            categories: vec!["A & B".to_string(), "C".to_string()],
            mode: DateMode::Single,
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..FilterParams::default()
        };
        assert_eq!(
            hidden_filters(&params),
            "<input type=\"hidden\" name=\"categories\" value=\"A &amp; B,C\">\
             <input type=\"hidden\" name=\"mode\" value=\"single\">\
             <input type=\"hidden\" name=\"date\" value=\"2024-03-01\">"
        );
    }

    #[test]
    fn test_filter_form_checks_selected() {
        let params = FilterParams {
            categories: vec!["Studio".to_string()],
            ..FilterParams::default()
        };
        let html = filter_form(
            "/",
            &params,
            &["Studio".to_string(), "Loft".to_string()],
            None,
        );
        assert!(html.contains("value=\"Studio\" checked"));
        assert!(!html.contains("value=\"Loft\" checked"));
        assert!(html.contains("value=\"range\" checked"));
    }
}
