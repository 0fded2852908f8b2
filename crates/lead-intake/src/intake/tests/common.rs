use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;
use tokio::sync::Notify;

use crate::intake::controller::SubmissionController;
use crate::intake::desk::IntakeDesk;
use crate::intake::domain::{ContactMessage, FieldValue, PropertyRequest};
use crate::intake::loader::RemoteClientLoader;
use crate::intake::notify::{Notice, NoticeLevel, NotificationSink};
use crate::intake::store::{DataStore, Row, StoreError};
use crate::intake::validation::Validator;

#[derive(Default)]
pub(super) struct MemoryStore {
    rows: Mutex<Vec<(String, Row)>>,
}

impl MemoryStore {
    pub(super) fn rows(&self) -> Vec<(String, Row)> {
        self.rows.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn insert(&self, table: &str, row: Row) -> Result<(), StoreError> {
        self.rows
            .lock()
            .expect("store mutex poisoned")
            .push((table.to_string(), row));
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct FailingStore {
    attempts: AtomicUsize,
}

impl FailingStore {
    pub(super) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataStore for FailingStore {
    async fn insert(&self, table: &str, _row: Row) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Rejected {
            table: table.to_string(),
            status: 403,
            detail: "permission denied for table".to_string(),
        })
    }
}

/// Store that parks every insert until the test releases it.
#[derive(Default)]
pub(super) struct GatedStore {
    pub(super) entered: Notify,
    pub(super) release: Notify,
    rows: Mutex<Vec<Row>>,
}

impl GatedStore {
    pub(super) fn rows(&self) -> Vec<Row> {
        self.rows.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl DataStore for GatedStore {
    async fn insert(&self, _table: &str, row: Row) -> Result<(), StoreError> {
        self.rows.lock().expect("store mutex poisoned").push(row);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub(super) fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }

    pub(super) fn levels(&self) -> Vec<NoticeLevel> {
        self.notices().into_iter().map(|notice| notice.level).collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify_success(&self, text: &str) {
        self.notices
            .lock()
            .expect("notice mutex poisoned")
            .push(Notice::success(text));
    }

    fn notify_error(&self, text: &str) {
        self.notices
            .lock()
            .expect("notice mutex poisoned")
            .push(Notice::error(text));
    }
}

pub(super) fn ready_loader<S>(store: Arc<S>) -> Arc<RemoteClientLoader<S>> {
    Arc::new(RemoteClientLoader::with_client(store))
}

pub(super) fn controller<T, S>(
    loader: Arc<RemoteClientLoader<S>>,
    notifier: Arc<RecordingNotifier>,
) -> SubmissionController<T, S, RecordingNotifier>
where
    T: crate::intake::domain::IntakeForm,
    S: DataStore + 'static,
{
    SubmissionController::new(loader, notifier, Validator::default())
}

pub(super) fn build_desk() -> (
    IntakeDesk<MemoryStore, RecordingNotifier>,
    Arc<MemoryStore>,
    Arc<RecordingNotifier>,
) {
    let store = Arc::new(MemoryStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let desk = IntakeDesk::new(
        ready_loader(Arc::clone(&store)),
        Arc::clone(&notifier),
        Validator::default(),
    );
    (desk, store, notifier)
}

pub(super) fn complete_request() -> PropertyRequest {
    PropertyRequest {
        name: "Jane Smith".to_string(),
        email: "jane@example.com".to_string(),
        wishlist: "Two bedroom terrace with a courtyard".to_string(),
        gender: "Female".to_string(),
        budget: "$600k - $700k".to_string(),
        location: "Fitzroy North".to_string(),
        notes: "Pet-friendly, renovation okay".to_string(),
        buyer_confirmed: true,
    }
}

/// Enter every field of `request` through the controller, one update per field.
pub(super) fn fill_request<S>(
    controller: &SubmissionController<PropertyRequest, S, RecordingNotifier>,
    request: &PropertyRequest,
) where
    S: DataStore + 'static,
{
    let updates = [
        ("name", FieldValue::text(&request.name)),
        ("email", FieldValue::text(&request.email)),
        ("wishlist", FieldValue::text(&request.wishlist)),
        ("gender", FieldValue::text(&request.gender)),
        ("budget", FieldValue::text(&request.budget)),
        ("location", FieldValue::text(&request.location)),
        ("notes", FieldValue::text(&request.notes)),
        ("buyer_confirmed", FieldValue::Flag(request.buyer_confirmed)),
    ];
    for (name, value) in updates {
        controller.set_field(name, value).expect("field in schema");
    }
}

pub(super) fn fill_contact<S>(
    controller: &SubmissionController<ContactMessage, S, RecordingNotifier>,
    email: &str,
    message: &str,
) where
    S: DataStore + 'static,
{
    controller
        .set_field("email", FieldValue::text(email))
        .expect("email in schema");
    controller
        .set_field("message", FieldValue::text(message))
        .expect("message in schema");
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
