use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::notify::NotificationSink;
use crate::config::{BackendConfig, BackendSettings, ConfigurationError};

/// User-facing text when the backend client can't be brought up.
pub const UNAVAILABLE_MESSAGE: &str =
    "Submissions are unavailable right now. Please try again later.";

/// Readiness of the shared backend client. Only ever moves forward out of `NotLoaded`.
pub enum ClientReadiness<C> {
    NotLoaded,
    Ready(Arc<C>),
    Failed(String),
}

impl<C> ClientReadiness<C> {
    pub fn is_ready(&self) -> bool {
        matches!(self, ClientReadiness::Ready(_))
    }

    pub fn view(&self) -> ReadinessView {
        match self {
            ClientReadiness::NotLoaded => ReadinessView {
                status: "not_loaded",
                reason: None,
            },
            ClientReadiness::Ready(_) => ReadinessView {
                status: "ready",
                reason: None,
            },
            ClientReadiness::Failed(reason) => ReadinessView {
                status: "failed",
                reason: Some(reason.clone()),
            },
        }
    }
}

impl<C> Clone for ClientReadiness<C> {
    fn clone(&self) -> Self {
        match self {
            ClientReadiness::NotLoaded => ClientReadiness::NotLoaded,
            ClientReadiness::Ready(client) => ClientReadiness::Ready(Arc::clone(client)),
            ClientReadiness::Failed(reason) => ClientReadiness::Failed(reason.clone()),
        }
    }
}

impl<C> fmt::Debug for ClientReadiness<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientReadiness::NotLoaded => f.write_str("NotLoaded"),
            ClientReadiness::Ready(_) => f.write_str("Ready"),
            ClientReadiness::Failed(reason) => f.debug_tuple("Failed").field(reason).finish(),
        }
    }
}

/// Serializable readiness for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessView {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Failure constructing the backend client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientLoadError {
    #[error("invalid backend endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("backend client initialization failed: {0}")]
    Initialization(String),
    #[error("backend unreachable: {0}")]
    Network(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Client(#[from] ClientLoadError),
    #[error("backend client initialization already started")]
    AlreadyStarted,
}

/// Builds the concrete backend client from validated settings.
#[async_trait]
pub trait ClientConnector: Send + Sync {
    type Client: Send + Sync + 'static;

    async fn connect(&self, settings: &BackendSettings) -> Result<Self::Client, ClientLoadError>;
}

/// Owner of the single shared backend client handle.
pub struct RemoteClientLoader<C> {
    state: RwLock<ClientReadiness<C>>,
    started: AtomicBool,
}

impl<C> Default for RemoteClientLoader<C> {
    fn default() -> Self {
        Self {
            state: RwLock::new(ClientReadiness::NotLoaded),
            started: AtomicBool::new(false),
        }
    }
}

impl<C> fmt::Debug for RemoteClientLoader<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteClientLoader")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<C> RemoteClientLoader<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader that already holds a client, for wiring in-process stores.
    pub fn with_client(client: Arc<C>) -> Self {
        Self {
            state: RwLock::new(ClientReadiness::Ready(client)),
            started: AtomicBool::new(true),
        }
    }

    /// Non-blocking snapshot of the current readiness.
    pub fn state(&self) -> ClientReadiness<C> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_ready()
    }

    fn settle(&self, next: ClientReadiness<C>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if matches!(*state, ClientReadiness::NotLoaded) {
            *state = next;
        }
    }
}

impl<C: Send + Sync + 'static> RemoteClientLoader<C> {
    /// Resolve the configuration and connect, exactly once per loader.
    ///
    /// Any failure moves the loader to `Failed` for good and is reported once through
    /// `notifier`; later calls return [`LoadError::AlreadyStarted`] without connecting.
    pub async fn initialize<K, N>(
        &self,
        config: &BackendConfig,
        connector: &K,
        notifier: &N,
    ) -> Result<Arc<C>, LoadError>
    where
        K: ClientConnector<Client = C> + ?Sized,
        N: NotificationSink + ?Sized,
    {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("backend client initialization requested again; ignoring");
            return Err(LoadError::AlreadyStarted);
        }

        let settings = match config.settings() {
            Ok(settings) => settings,
            Err(err) => {
                error!(error = %err, "backend configuration incomplete; intake forms disabled");
                self.settle(ClientReadiness::Failed(err.to_string()));
                notifier.notify_error(UNAVAILABLE_MESSAGE);
                return Err(err.into());
            }
        };

        debug!(endpoint = %settings.endpoint_url, "connecting backend client");
        match connector.connect(&settings).await {
            Ok(client) => {
                let client = Arc::new(client);
                self.settle(ClientReadiness::Ready(Arc::clone(&client)));
                info!(endpoint = %settings.endpoint_url, "backend client ready");
                Ok(client)
            }
            Err(err) => {
                error!(error = %err, "backend client failed to load; intake forms disabled");
                self.settle(ClientReadiness::Failed(err.to_string()));
                notifier.notify_error(UNAVAILABLE_MESSAGE);
                Err(err.into())
            }
        }
    }

    /// Run [`initialize`](Self::initialize) on a background task.
    pub fn spawn_initialize<K, N>(
        self: &Arc<Self>,
        config: BackendConfig,
        connector: K,
        notifier: Arc<N>,
    ) -> JoinHandle<Result<Arc<C>, LoadError>>
    where
        K: ClientConnector<Client = C> + 'static,
        N: NotificationSink + ?Sized + 'static,
    {
        let loader = Arc::clone(self);
        tokio::spawn(async move {
            loader
                .initialize(&config, &connector, notifier.as_ref())
                .await
        })
    }
}
