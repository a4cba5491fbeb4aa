//! Pure view transformations over snapshot rows
//!
//! Everything the HTTP handlers do to a row set lives here as plain
//! functions, so the paging/grouping/selection behavior is unit-testable
//! without a socket.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde_json::Value;
use snapsync_core::Row;

/// Catch-all group for rows without a group title.
const DEFAULT_GROUP: &str = "all";

/// Paging bounds for the raw-rows endpoint.
pub const LIMIT_MIN: usize = 1;
pub const LIMIT_MAX: usize = 1000;
pub const LIMIT_DEFAULT: usize = 10;

/// Slice a page out of the row set; returns the page (total row count is
/// the caller's `rows.len()`).
pub fn paginate(rows: &[Row], limit: usize, offset: usize) -> &[Row] {
    if offset >= rows.len() {
        return &[];
    }
    let end = (offset + limit).min(rows.len());
    &rows[offset..end]
}

/// One per-row chart point; rows without a date are dropped.
pub fn chart_points(rows: &[Row]) -> Vec<Value> {
    let mut points: Vec<(String, Value)> = rows
        .iter()
        .filter_map(|row| {
            let date = date_field(row, "progress_date")?;
            let point = serde_json::json!({
                "date": &date,
                "group": row.get("study_group_title").cloned().unwrap_or(Value::Null),
                "increased": row.get("increased_users").cloned().unwrap_or(Value::Null),
                "total": row.get("total_users").cloned().unwrap_or(Value::Null),
                "rate": row.get("rate").cloned().unwrap_or(Value::Null),
            });
            Some((date, point))
        })
        .collect();
    // Ascending by date string (dates are YYYY-MM-DD).
    points.sort_by(|a, b| a.0.cmp(&b.0));
    points.into_iter().map(|(_, p)| p).collect()
}

/// One group's time series, aligned to the shared label set with nulls
/// where the group has no record for a date.
#[derive(Debug, serde::Serialize, PartialEq)]
pub struct GroupSeries {
    pub group: String,
    pub rate: Vec<Value>,
    pub increased: Vec<Value>,
    pub total: Vec<Value>,
}

/// Build the grouped time series: labels are the sorted union of all dates
/// seen (after group filtering); series are sorted by group name.
pub fn grouped_series(
    rows: &[Row],
    want: Option<&HashSet<String>>,
) -> (Vec<String>, Vec<GroupSeries>) {
    let mut dates: BTreeSet<String> = BTreeSet::new();
    let mut grid: BTreeMap<String, BTreeMap<String, &Row>> = BTreeMap::new();

    for row in rows {
        let Some(date) = date_field(row, "progress_date") else {
            continue;
        };
        let group = str_field(row, "study_group_title")
            .unwrap_or(DEFAULT_GROUP)
            .to_string();
        if let Some(want) = want {
            if !want.contains(&group) {
                continue;
            }
        }
        dates.insert(date.clone());
        grid.entry(group).or_default().insert(date, row);
    }

    let labels: Vec<String> = dates.into_iter().collect();
    let series = grid
        .into_iter()
        .map(|(group, by_date)| {
            let pick = |field: &str| -> Vec<Value> {
                labels
                    .iter()
                    .map(|date| {
                        by_date
                            .get(date)
                            .and_then(|row| row.get(field).cloned())
                            .unwrap_or(Value::Null)
                    })
                    .collect()
            };
            GroupSeries {
                rate: pick("rate"),
                increased: pick("increased_users"),
                total: pick("total_users"),
                group,
            }
        })
        .collect();

    (labels, series)
}

/// Distinct opentalk codes in first-seen order.
pub fn option_codes(rows: &[Row]) -> Vec<String> {
    distinct_values(rows, "opentalk_code")
}

/// Distinct nicknames for one code, in first-seen order.
pub fn nicknames_for(rows: &[Row], code: &str) -> Vec<String> {
    let filtered: Vec<Row> = rows
        .iter()
        .filter(|row| str_field(row, "opentalk_code") == Some(code))
        .cloned()
        .collect();
    distinct_values(&filtered, "nickname")
}

/// Progress time series for one member: labels = progress dates, values =
/// progress as numbers (string-encoded numerics are coerced).
pub fn member_series(rows: &[Row], code: &str, nick: &str) -> (Vec<String>, Vec<Value>) {
    let mut labels = Vec::new();
    let mut values = Vec::new();
    for row in rows {
        if str_field(row, "opentalk_code") != Some(code) || str_field(row, "nickname") != Some(nick)
        {
            continue;
        }
        let Some(date) = date_field(row, "progress_date") else {
            continue;
        };
        labels.push(date);
        values.push(numeric(row.get("progress")));
    }
    (labels, values)
}

/// How many certification rows the table view shows.
const CERT_TABLE_LIMIT: usize = 20;

/// Certification rows for one code, ranked ascending, top 20.
pub fn cert_table(rows: &[Row], code: &str) -> Vec<Row> {
    let mut filtered: Vec<Row> = rows
        .iter()
        .filter(|row| str_field(row, "opentalk_code") == Some(code))
        .cloned()
        .collect();
    filtered.sort_by_key(|row| rank(row.get("user_rank")));
    filtered.truncate(CERT_TABLE_LIMIT);
    filtered
}

fn distinct_values(rows: &[Row], field: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for row in rows {
        if let Some(value) = str_field(row, field) {
            if !seen.iter().any(|s: &String| s == value) {
                seen.push(value.to_string());
            }
        }
    }
    seen
}

/// Non-empty string field accessor.
fn str_field<'a>(row: &'a Row, field: &str) -> Option<&'a str> {
    match row.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

/// Date label accessor. The exporter writes dates as strings, but rows with
/// a numeric date are kept (rendered as the number's text) rather than
/// dropped; only empty or absent dates are skipped.
fn date_field(row: &Row, field: &str) -> Option<String> {
    match row.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce a value to a JSON number where possible (snapshots sometimes
/// carry numerics as strings), else null.
fn numeric(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Number(n)) => Value::Number(n.clone()),
        Some(Value::String(s)) => s
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn rank(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(i64::MAX),
        Some(Value::String(s)) => s.parse().unwrap_or(i64::MAX),
        _ => i64::MAX,
    }
}
