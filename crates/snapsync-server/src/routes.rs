//! HTTP routes
//!
//! Thin handlers over the pure view functions: parameter validation and
//! snapshot loading happen here, shaping stays in `views`.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;
use crate::views;

/// Single-page Chart.js dashboard, served as-is.
const DASHBOARD_HTML: &str = include_str!("assets/dashboard.html");

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/rows", get(rows))
        .route("/chart", get(chart))
        .route("/chart_grouped", get(chart_grouped))
        .route("/options", get(options))
        .route("/series", get(series))
        .route("/table", get(table))
        .route("/dashboard", get(dashboard))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct PageParams {
    limit: Option<usize>,
    offset: Option<usize>,
}

async fn rows(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, ApiError> {
    let limit = params.limit.unwrap_or(views::LIMIT_DEFAULT);
    if !(views::LIMIT_MIN..=views::LIMIT_MAX).contains(&limit) {
        return Err(ApiError::InvalidParam(format!(
            "limit must be between {} and {}",
            views::LIMIT_MIN,
            views::LIMIT_MAX
        )));
    }
    let offset = params.offset.unwrap_or(0);

    let rows = state.progress_rows()?;
    let page = views::paginate(&rows, limit, offset);
    Ok(Json(json!({
        "ok": true,
        "total": rows.len(),
        "limit": limit,
        "offset": offset,
        "count": page.len(),
        "rows": page,
    })))
}

async fn chart(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let rows = state.progress_rows()?;
    let points = views::chart_points(&rows);
    Ok(Json(json!({ "ok": true, "points": points })))
}

#[derive(Debug, Deserialize)]
struct GroupParams {
    /// Comma-separated group titles; absent means all groups
    group: Option<String>,
}

async fn chart_grouped(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GroupParams>,
) -> Result<Json<Value>, ApiError> {
    let want: Option<HashSet<String>> = params.group.map(|raw| {
        raw.split(',')
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect()
    });

    let rows = state.progress_rows()?;
    let (labels, series) = views::grouped_series(&rows, want.as_ref());
    Ok(Json(json!({ "ok": true, "labels": labels, "series": series })))
}

#[derive(Debug, Deserialize)]
struct OptionParams {
    code: Option<String>,
}

async fn options(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OptionParams>,
) -> Result<Json<Value>, ApiError> {
    let rows = state.progress_rows()?;
    let codes = views::option_codes(&rows);
    let nicknames = params
        .code
        .as_deref()
        .map(|code| views::nicknames_for(&rows, code));
    Ok(Json(json!({ "ok": true, "codes": codes, "nicknames": nicknames })))
}

#[derive(Debug, Deserialize)]
struct SeriesParams {
    code: String,
    nick: String,
}

async fn series(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SeriesParams>,
) -> Result<Json<Value>, ApiError> {
    let rows = state.progress_rows()?;
    let (labels, values) = views::member_series(&rows, &params.code, &params.nick);
    Ok(Json(json!({ "ok": true, "labels": labels, "values": values })))
}

#[derive(Debug, Deserialize)]
struct TableParams {
    code: String,
}

async fn table(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TableParams>,
) -> Result<Json<Value>, ApiError> {
    let rows = state.cert_rows()?;
    let table = views::cert_table(&rows, &params.code);
    Ok(Json(json!({ "ok": true, "rows": table })))
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}
