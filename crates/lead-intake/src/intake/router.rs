use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::controller::{BlockReason, SubmissionController, SubmitOutcome, NOT_LOADED_MESSAGE};
use super::desk::IntakeDesk;
use super::domain::{FieldValue, IntakeForm};
use super::loader::{RemoteClientLoader, UNAVAILABLE_MESSAGE};
use super::notify::NotificationSink;
use super::store::DataStore;

/// Body of a single field update.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldUpdate {
    pub field: String,
    pub value: FieldValue,
}

/// Router exposing both intake forms and the backend client readiness.
pub fn intake_router<S, N>(desk: &IntakeDesk<S, N>) -> Router
where
    S: DataStore + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let readiness = Router::new()
        .route("/api/v1/client", get(readiness_handler::<S>))
        .with_state(Arc::clone(desk.loader()));

    Router::new()
        .merge(form_router(Arc::clone(desk.property_requests())))
        .merge(form_router(Arc::clone(desk.contact_messages())))
        .merge(readiness)
}

/// Routes for one form, mounted under `/api/v1/forms/{slug}`.
pub fn form_router<T, S, N>(controller: Arc<SubmissionController<T, S, N>>) -> Router
where
    T: IntakeForm,
    S: DataStore + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    let base = format!("/api/v1/forms/{}", T::SLUG);
    Router::new()
        .route(
            &base,
            get(view_handler::<T, S, N>).patch(update_handler::<T, S, N>),
        )
        .route(&format!("{base}/submit"), post(submit_handler::<T, S, N>))
        .route(&format!("{base}/reset"), post(reset_handler::<T, S, N>))
        .with_state(controller)
}

pub(crate) async fn readiness_handler<S>(
    State(loader): State<Arc<RemoteClientLoader<S>>>,
) -> Response
where
    S: Send + Sync + 'static,
{
    (StatusCode::OK, Json(loader.state().view())).into_response()
}

pub(crate) async fn view_handler<T, S, N>(
    State(controller): State<Arc<SubmissionController<T, S, N>>>,
) -> Response
where
    T: IntakeForm,
    S: DataStore + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    (StatusCode::OK, Json(controller.view())).into_response()
}

pub(crate) async fn update_handler<T, S, N>(
    State(controller): State<Arc<SubmissionController<T, S, N>>>,
    Json(update): Json<FieldUpdate>,
) -> Response
where
    T: IntakeForm,
    S: DataStore + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    match controller.set_field(&update.field, update.value) {
        Ok(()) => (StatusCode::OK, Json(controller.view())).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn reset_handler<T, S, N>(
    State(controller): State<Arc<SubmissionController<T, S, N>>>,
) -> Response
where
    T: IntakeForm,
    S: DataStore + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    controller.reset();
    (StatusCode::OK, Json(controller.view())).into_response()
}

pub(crate) async fn submit_handler<T, S, N>(
    State(controller): State<Arc<SubmissionController<T, S, N>>>,
) -> Response
where
    T: IntakeForm,
    S: DataStore + 'static,
    N: NotificationSink + ?Sized + 'static,
{
    // The attempt runs on its own task so a dropped request cannot cancel a send.
    let attempt = Arc::clone(&controller);
    let outcome = match tokio::spawn(async move { attempt.submit().await }).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(form = T::SLUG, error = %err, "submit task aborted");
            let payload = json!({
                "status": "error",
                "message": T::FAILURE_MESSAGE,
            });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
        }
    };

    match outcome {
        SubmitOutcome::Succeeded => {
            let payload = json!({
                "status": "succeeded",
                "message": T::SUCCESS_MESSAGE,
                "form": controller.view(),
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        SubmitOutcome::Rejected(error) => {
            let payload = json!({
                "status": "rejected",
                "message": error.message,
                "missing": error.missing,
                "unconfirmed": error.unconfirmed,
                "malformed": error.malformed,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        SubmitOutcome::Blocked(reason) => {
            let message = match reason {
                BlockReason::ClientNotLoaded => NOT_LOADED_MESSAGE,
                BlockReason::ClientFailed(_) => UNAVAILABLE_MESSAGE,
            };
            let payload = json!({
                "status": "blocked",
                "message": message,
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
        }
        SubmitOutcome::Failed(_) => {
            let payload = json!({
                "status": "failed",
                "message": T::FAILURE_MESSAGE,
            });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
        SubmitOutcome::InFlight => {
            let payload = json!({
                "status": "in_flight",
                "message": "A submission for this form is already in progress.",
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
    }
}
