// HTTP request handlers
use crate::application::refresh_scheduler::{FeedPhase, FeedStatus};
use crate::domain::telemetry::Metric;
use crate::error::Feed;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct FeedReport {
    pub feed: Feed,
    pub phase: FeedPhase,
    pub submitted: u64,
    #[serde(flatten)]
    pub status: FeedStatus,
}

impl FeedReport {
    fn new(feed: Feed, status: FeedStatus) -> Self {
        Self {
            feed,
            phase: status.phase(),
            submitted: status.submitted(),
            status,
        }
    }
}

#[derive(Serialize)]
pub struct StatusReport {
    pub running: bool,
    pub feeds: Vec<FeedReport>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest formatted current readouts
pub async fn current_values(State(state): State<Arc<AppState>>) -> Response {
    match state.store.current() {
        Some(view) => Json(view).into_response(),
        None => (StatusCode::NOT_FOUND, "no current data yet").into_response(),
    }
}

/// Latest chart series
pub async fn chart_series(State(state): State<Arc<AppState>>) -> Response {
    match state.store.series() {
        Some(series) => Json(series).into_response(),
        None => (StatusCode::NOT_FOUND, "no history data yet").into_response(),
    }
}

/// One metric's chart series, e.g. `/api/dashboard/series/temperature`
pub async fn metric_series(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    let metric: Metric = match name.parse() {
        Ok(metric) => metric,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let Some(series) = state.store.series() else {
        return (StatusCode::NOT_FOUND, "no history data yet").into_response();
    };
    match series.get(metric) {
        Some(chart) => Json(chart.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, format!("no series for {}", metric)).into_response(),
    }
}

/// Fetch both feeds now without waiting for the next tick
pub async fn trigger_refresh(State(state): State<Arc<AppState>>) -> StatusCode {
    let dispatched = state.scheduler.refresh_now();
    if dispatched.is_empty() {
        tracing::warn!("Refresh requested while the scheduler is stopped");
        return StatusCode::CONFLICT;
    }
    tracing::info!("Manual refresh dispatched for {} feeds", dispatched.len());
    StatusCode::ACCEPTED
}

/// Scheduler status per feed
pub async fn refresh_status(State(state): State<Arc<AppState>>) -> Json<StatusReport> {
    let feeds = [Feed::Current, Feed::History]
        .into_iter()
        .map(|feed| FeedReport::new(feed, state.scheduler.status(feed)))
        .collect();

    Json(StatusReport {
        running: state.scheduler.is_running(),
        feeds,
    })
}
