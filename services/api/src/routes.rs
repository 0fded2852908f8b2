use crate::infra::{AppState, NoticeBoard};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use lead_intake::intake::{intake_router, IntakeDesk, RestStore};
use serde_json::json;
use std::sync::atomic::Ordering;

pub(crate) fn with_intake_routes(desk: &IntakeDesk<RestStore, NoticeBoard>) -> Router {
    intake_router(desk)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/notice", get(notice_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready once the listener is bound and the backend client has loaded.
pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let listening = state.listening.load(Ordering::Acquire);
    let client = state.loader.state();

    let (status, label) = match (listening, client.is_ready()) {
        (true, true) => (StatusCode::OK, "ready"),
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "initializing"),
        (true, false) => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
    };

    (
        status,
        Json(json!({ "status": label, "client": client.view() })),
    )
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn notice_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    Json(json!({ "notice": state.notices.latest() }))
}
