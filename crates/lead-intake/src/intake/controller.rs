use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{persisted_row, FieldValue, IntakeForm};
use super::form::{FormError, FormState};
use super::loader::{ClientReadiness, ReadinessView, RemoteClientLoader};
use super::notify::NotificationSink;
use super::store::{DataStore, StoreError};
use super::validation::{ValidationError, Validator};

/// Shown when a submit arrives before the backend client has loaded.
pub const NOT_LOADED_MESSAGE: &str =
    "We're still connecting to our service. Please try again in a moment.";

/// Where the current submit attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    Idle,
    Validating,
    Rejected,
    AwaitingClient,
    Blocked,
    Sending,
    Succeeded,
    Failed,
}

impl SubmissionPhase {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionPhase::Idle => "idle",
            SubmissionPhase::Validating => "validating",
            SubmissionPhase::Rejected => "rejected",
            SubmissionPhase::AwaitingClient => "awaiting_client",
            SubmissionPhase::Blocked => "blocked",
            SubmissionPhase::Sending => "sending",
            SubmissionPhase::Succeeded => "succeeded",
            SubmissionPhase::Failed => "failed",
        }
    }
}

/// Why a valid submission could not be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    ClientNotLoaded,
    ClientFailed(String),
}

/// Result of one submit intent.
#[derive(Debug)]
pub enum SubmitOutcome {
    Succeeded,
    Rejected(ValidationError),
    Blocked(BlockReason),
    Failed(StoreError),
    /// Another attempt for the same form was still running; nothing happened.
    InFlight,
}

impl SubmitOutcome {
    pub fn phase(&self) -> Option<SubmissionPhase> {
        match self {
            SubmitOutcome::Succeeded => Some(SubmissionPhase::Succeeded),
            SubmitOutcome::Rejected(_) => Some(SubmissionPhase::Rejected),
            SubmitOutcome::Blocked(_) => Some(SubmissionPhase::Blocked),
            SubmitOutcome::Failed(_) => Some(SubmissionPhase::Failed),
            SubmitOutcome::InFlight => None,
        }
    }
}

/// Current form values plus everything the submit control needs.
#[derive(Debug, Clone, Serialize)]
pub struct FormView<T> {
    pub form: &'static str,
    pub values: T,
    pub submittable: bool,
    pub submit_enabled: bool,
    pub phase: SubmissionPhase,
    pub readiness: ReadinessView,
}

/// Drives submit attempts for one form instance.
pub struct SubmissionController<T, S, N: ?Sized> {
    form: Mutex<FormState<T>>,
    loader: Arc<RemoteClientLoader<S>>,
    notifier: Arc<N>,
    validator: Validator,
    phase: Mutex<SubmissionPhase>,
    in_flight: AtomicBool,
}

impl<T, S, N> SubmissionController<T, S, N>
where
    T: IntakeForm,
    S: DataStore + 'static,
    N: NotificationSink + ?Sized,
{
    pub fn new(loader: Arc<RemoteClientLoader<S>>, notifier: Arc<N>, validator: Validator) -> Self {
        Self {
            form: Mutex::new(FormState::new()),
            loader,
            notifier,
            validator,
            phase: Mutex::new(SubmissionPhase::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    fn form(&self) -> MutexGuard<'_, FormState<T>> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: SubmissionPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    pub fn phase(&self) -> SubmissionPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn loader(&self) -> &Arc<RemoteClientLoader<S>> {
        &self.loader
    }

    pub fn snapshot(&self) -> T {
        self.form().snapshot()
    }

    pub fn set_field(&self, name: &str, value: FieldValue) -> Result<(), FormError> {
        self.form().set_field(name, value)
    }

    pub fn set(&self, field: T::Field, value: FieldValue) -> Result<(), FormError> {
        self.form().set(field, value)
    }

    pub fn reset(&self) {
        self.form().reset();
    }

    pub fn submittable(&self) -> bool {
        self.validator.submittable(&self.snapshot())
    }

    /// Whether the submit control should currently accept input.
    pub fn submit_enabled(&self) -> bool {
        self.loader.is_ready() && !self.in_flight.load(Ordering::Acquire) && self.submittable()
    }

    pub fn view(&self) -> FormView<T> {
        let values = self.snapshot();
        let submittable = self.validator.submittable(&values);
        let readiness = self.loader.state();
        FormView {
            form: T::SLUG,
            submit_enabled: readiness.is_ready()
                && !self.in_flight.load(Ordering::Acquire)
                && submittable,
            readiness: readiness.view(),
            values,
            submittable,
            phase: self.phase(),
        }
    }

    /// Run one submit attempt to completion.
    ///
    /// The form is read once up front; edits made while the row is in flight are not sent.
    /// A call made while another attempt is running returns [`SubmitOutcome::InFlight`].
    pub async fn submit(&self) -> SubmitOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(form = T::SLUG, "submit ignored; attempt already in flight");
            return SubmitOutcome::InFlight;
        }
        let _attempt = AttemptGuard { controller: self };

        self.set_phase(SubmissionPhase::Validating);
        let snapshot = self.snapshot();
        if let Err(err) = self.validator.check(&snapshot) {
            debug!(form = T::SLUG, missing = ?err.missing, "submission rejected by validation");
            self.set_phase(SubmissionPhase::Rejected);
            self.notifier.notify_error(&err.message);
            return SubmitOutcome::Rejected(err);
        }

        self.set_phase(SubmissionPhase::AwaitingClient);
        let client = match self.loader.state() {
            ClientReadiness::Ready(client) => client,
            ClientReadiness::NotLoaded => {
                info!(form = T::SLUG, "submission blocked; backend client not loaded");
                self.set_phase(SubmissionPhase::Blocked);
                self.notifier.notify_error(NOT_LOADED_MESSAGE);
                return SubmitOutcome::Blocked(BlockReason::ClientNotLoaded);
            }
            ClientReadiness::Failed(reason) => {
                debug!(form = T::SLUG, %reason, "submission blocked; backend client failed");
                self.set_phase(SubmissionPhase::Blocked);
                return SubmitOutcome::Blocked(BlockReason::ClientFailed(reason));
            }
        };

        self.set_phase(SubmissionPhase::Sending);
        let row = persisted_row(&snapshot);
        match client.insert(T::TABLE, row).await {
            Ok(()) => {
                self.form().reset();
                self.set_phase(SubmissionPhase::Succeeded);
                info!(form = T::SLUG, table = T::TABLE, "submission stored");
                self.notifier.notify_success(T::SUCCESS_MESSAGE);
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                warn!(form = T::SLUG, table = T::TABLE, error = %err, "submission failed");
                self.set_phase(SubmissionPhase::Failed);
                self.notifier.notify_error(T::FAILURE_MESSAGE);
                SubmitOutcome::Failed(err)
            }
        }
    }
}

/// Returns the controller to `Idle` and releases the in-flight claim however the attempt ends.
struct AttemptGuard<'a, T, S, N: ?Sized> {
    controller: &'a SubmissionController<T, S, N>,
}

impl<T, S, N: ?Sized> Drop for AttemptGuard<'_, T, S, N> {
    fn drop(&mut self) {
        *self
            .controller
            .phase
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = SubmissionPhase::Idle;
        self.controller.in_flight.store(false, Ordering::Release);
    }
}
