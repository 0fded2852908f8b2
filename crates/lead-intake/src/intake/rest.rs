use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::loader::{ClientConnector, ClientLoadError};
use super::store::{DataStore, Row, StoreError};
use crate::config::BackendSettings;

/// Data store speaking the PostgREST row-insert dialect (`POST /rest/v1/{table}`).
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base: Url,
}

impl RestStore {
    pub fn new(settings: &BackendSettings) -> Result<Self, ClientLoadError> {
        let base = parse_endpoint(&settings.endpoint_url)?;

        let invalid_key = |_| {
            ClientLoadError::Initialization("access key is not a valid header value".to_string())
        };
        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(&settings.access_key).map_err(invalid_key)?;
        api_key.set_sensitive(true);
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", settings.access_key)).map_err(invalid_key)?;
        bearer.set_sensitive(true);
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("prefer", HeaderValue::from_static("return=minimal"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| ClientLoadError::Initialization(err.to_string()))?;

        Ok(Self { client, base })
    }

    pub fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        self.base
            .join(&format!("rest/v1/{table}"))
            .map_err(|err| StoreError::Unavailable(format!("invalid table url: {err}")))
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ClientLoadError> {
    let invalid = |reason: String| ClientLoadError::InvalidEndpoint {
        endpoint: raw.to_string(),
        reason,
    };

    // A trailing slash keeps `Url::join` from dropping the last path segment.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(invalid(format!("unsupported scheme '{scheme}'"))),
    }
}

#[async_trait]
impl DataStore for RestStore {
    async fn insert(&self, table: &str, row: Row) -> Result<(), StoreError> {
        let url = self.table_url(table)?;
        debug!(%table, "inserting row");

        let response = self
            .client
            .post(url)
            .json(&row)
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response
            .text()
            .await
            .unwrap_or_else(|err| format!("unreadable response body: {err}"));
        Err(StoreError::Rejected {
            table: table.to_string(),
            status: status.as_u16(),
            detail,
        })
    }
}

/// Connector producing a [`RestStore`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RestConnector;

#[async_trait]
impl ClientConnector for RestConnector {
    type Client = RestStore;

    async fn connect(&self, settings: &BackendSettings) -> Result<RestStore, ClientLoadError> {
        RestStore::new(settings)
    }
}
