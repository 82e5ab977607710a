mod live;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use livewall_aggregator::Aggregator;
use livewall_core::AppConfig;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState,
};

/// Upper bound on `max` accepted by `/api/fetch-live`.
pub const MAX_FETCH_LIMIT: u32 = 50;

/// Query and per-platform count used when a request does not supply them.
#[derive(Debug, Clone)]
pub struct RefreshDefaults {
    pub query: String,
    pub limit: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub defaults: Arc<RefreshDefaults>,
}

impl AppState {
    #[must_use]
    pub fn new(aggregator: Arc<Aggregator>, config: &AppConfig) -> Self {
        Self {
            aggregator,
            defaults: Arc::new(RefreshDefaults {
                query: config.default_query.clone(),
                limit: config.default_limit,
            }),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store: &'static str,
}

/// Resolves the per-platform count for a refresh: the configured default
/// when absent, clamped to `1..=MAX_FETCH_LIMIT`.
pub(super) fn normalize_limit(requested: Option<i64>, default: u32) -> u32 {
    let clamped = requested
        .unwrap_or_else(|| i64::from(default))
        .clamp(1, i64::from(MAX_FETCH_LIMIT));
    u32::try_from(clamped).unwrap_or(MAX_FETCH_LIMIT)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn no_store() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/fetch-live", get(live::fetch_live))
        .layer(
            // Auth runs first so rejected callers never spend the shared window.
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let live_routes = Router::new()
        .route("/api/live", get(live::get_live))
        .merge(protected_router(auth, rate_limit))
        .layer(no_store());
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(live_routes)
        .merge(public_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.aggregator.store().health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                store: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: snapshot store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    store: "unavailable",
                }),
            )
        }
    }
}

/// At most 30 manual refreshes per minute across all callers.
pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(30, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
