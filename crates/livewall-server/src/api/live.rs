//! `/api/live` (read the stored snapshot) and `/api/fetch-live` (refresh
//! now and respond with the result).

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use livewall_aggregator::{read_snapshot, ReadOutcome};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{normalize_limit, AppState};
use crate::middleware::RequestId;

/// Body returned whenever there is no snapshot to serve.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmptyLive {
    live: Vec<Value>,
    all: Vec<Value>,
    by_platform: Map<String, Value>,
    error: &'static str,
}

impl EmptyLive {
    fn new(error: &'static str) -> Self {
        Self {
            live: Vec::new(),
            all: Vec::new(),
            by_platform: Map::new(),
            error,
        }
    }
}

#[derive(Debug, Serialize)]
struct FetchError {
    error: String,
}

pub(super) async fn get_live(State(state): State<AppState>) -> Response {
    let outcome = read_snapshot(state.aggregator.store()).await;
    let status = match &outcome {
        ReadOutcome::Found(snapshot) => return Json(snapshot).into_response(),
        ReadOutcome::Empty => StatusCode::OK,
        ReadOutcome::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ReadOutcome::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let error = outcome.diagnostic().unwrap_or_default();
    (status, Json(EmptyLive::new(error))).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct FetchLiveParams {
    q: Option<String>,
    /// Kept as a string so a malformed value falls back to the default
    /// instead of rejecting the request.
    max: Option<String>,
}

pub(super) async fn fetch_live(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Query(params): Query<FetchLiveParams>,
) -> Response {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(&state.defaults.query)
        .to_string();
    let max = params
        .max
        .as_deref()
        .and_then(|m| m.trim().parse::<i64>().ok());
    let limit = normalize_limit(max, state.defaults.limit);
    tracing::info!(
        request_id = request_id.as_ref().map_or("-", |Extension(id)| id.0.as_str()),
        query = %query,
        limit,
        "manual refresh requested"
    );

    let report = state.aggregator.refresh(&query, limit).await;

    if report.no_platforms() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(FetchError {
                error: "no platforms configured".to_string(),
            }),
        )
            .into_response();
    }
    if report.all_failed() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(FetchError {
                error: report.failure_summary(),
            }),
        )
            .into_response();
    }

    Json(report.snapshot).into_response()
}
