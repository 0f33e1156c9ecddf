use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::aggregate::{aggregate_by_date, aggregate_mean_by_meal};
use super::dto::{DashboardResponse, DetailResponse, RangeQuery};
use super::normalize::normalize;
use super::services::{detail_for_date, fetch_range, fetch_weight};
use crate::{
    auth::{BasicCredentials, Credentials},
    dates::{format_day, parse_day, validate_range},
    error::DashError,
    state::AppState,
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/days/:date/entries", get(get_day_entries))
}

/// GET /dashboard?start_date=..&end_date=..
#[instrument(skip(state, credentials), fields(username = %credentials.username))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    BasicCredentials(credentials): BasicCredentials,
    Query(query): Query<RangeQuery>,
) -> Result<Json<DashboardResponse>, (StatusCode, String)> {
    build_dashboard(&state, &credentials, &query)
        .await
        .map(Json)
        .map_err(reject)
}

/// GET /days/:date/entries, the table shown when a chart date is hovered.
#[instrument(skip(state, credentials), fields(username = %credentials.username))]
pub async fn get_day_entries(
    State(state): State<AppState>,
    BasicCredentials(credentials): BasicCredentials,
    Path(date): Path<String>,
) -> Result<Json<DetailResponse>, (StatusCode, String)> {
    let date = parse_day("date", &date).map_err(reject)?;

    let session = state
        .diary
        .connect(&credentials)
        .await
        .map_err(|e| reject(DashError::from_diary(e, "login")))?;
    let table = detail_for_date(session.as_ref(), date).await.map_err(reject)?;

    info!(date = %format_day(date), rows = table.rows.len(), "day detail built");
    Ok(Json(DetailResponse::from(table)))
}

async fn build_dashboard(
    state: &AppState,
    credentials: &Credentials,
    query: &RangeQuery,
) -> Result<DashboardResponse, DashError> {
    // validate before touching the remote service
    let start = parse_day("start_date", &query.start_date)?;
    let end = parse_day("end_date", &query.end_date)?;
    validate_range(start, end, state.config.max_range_days)?;

    let session = state
        .diary
        .connect(credentials)
        .await
        .map_err(|e| DashError::from_diary(e, "login"))?;

    let weight = fetch_weight(session.as_ref(), start, end).await?;
    let fetched = fetch_range(session.as_ref(), start, end, &state.config.fetch).await?;

    if fetched.days.iter().all(|d| d.entry_count() == 0) {
        return Err(DashError::EmptyRange { start, end });
    }

    let table = normalize(&fetched.days);
    let daily = aggregate_by_date(&table);
    let macros_by_meal = aggregate_mean_by_meal(&table);

    info!(
        start = %format_day(start),
        end = %format_day(end),
        rows = table.rows.len(),
        days = daily.len(),
        "dashboard built"
    );

    Ok(DashboardResponse {
        start_date: start,
        end_date: end,
        columns: table.columns,
        daily: daily.into_iter().map(Into::into).collect(),
        weight,
        macros_by_meal,
        missing_days: fetched.missing_days.into_iter().map(format_day).collect(),
    })
}

fn reject(err: DashError) -> (StatusCode, String) {
    let status = err.status();
    if status.is_server_error() {
        error!(error = %err, %status, "dashboard request failed");
    } else {
        warn!(error = %err, %status, "dashboard request rejected");
    }
    err.into()
}
