use async_trait::async_trait;
use lead_intake::config::BackendSettings;
use lead_intake::intake::{
    ClientConnector, ClientLoadError, DataStore, Notice, NotificationSink, RemoteClientLoader,
    RestStore, Row, StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) listening: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) notices: Arc<NoticeBoard>,
    pub(crate) loader: Arc<RemoteClientLoader<RestStore>>,
}

/// Single message banner shared by both forms; a new notice replaces the previous one.
#[derive(Debug, Default)]
pub(crate) struct NoticeBoard {
    latest: Mutex<Option<Notice>>,
}

impl NoticeBoard {
    pub(crate) fn latest(&self) -> Option<Notice> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn post(&self, notice: Notice) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(notice);
    }
}

impl NotificationSink for NoticeBoard {
    fn notify_success(&self, text: &str) {
        info!(notice = text, "posting success notice");
        self.post(Notice::success(text));
    }

    fn notify_error(&self, text: &str) {
        warn!(notice = text, "posting error notice");
        self.post(Notice::error(text));
    }
}

/// Process-local store used by the demo command.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryStore {
    rows: Arc<Mutex<Vec<(String, Row)>>>,
    reject_inserts: bool,
}

impl InMemoryStore {
    pub(crate) fn rejecting() -> Self {
        Self {
            reject_inserts: true,
            ..Self::default()
        }
    }

    pub(crate) fn rows(&self) -> Vec<(String, Row)> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn insert(&self, table: &str, row: Row) -> Result<(), StoreError> {
        if self.reject_inserts {
            return Err(StoreError::Unavailable(format!(
                "{table} is read only in this session"
            )));
        }
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((table.to_string(), row));
        Ok(())
    }
}

/// Hands out a shared [`InMemoryStore`] as the backend client.
#[derive(Debug, Clone)]
pub(crate) struct InMemoryConnector {
    store: InMemoryStore,
}

impl InMemoryConnector {
    pub(crate) fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ClientConnector for InMemoryConnector {
    type Client = InMemoryStore;

    async fn connect(&self, _settings: &BackendSettings) -> Result<InMemoryStore, ClientLoadError> {
        Ok(self.store.clone())
    }
}
