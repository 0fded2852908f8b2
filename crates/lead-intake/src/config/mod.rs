use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub backend: BackendConfig,
    pub intake: IntakeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        // Backend parameters stay optional here; the client loader owns the decision
        // that a missing value disables the forms.
        let backend = BackendConfig {
            endpoint_url: env::var("BACKEND_ENDPOINT_URL").ok(),
            access_key: env::var("BACKEND_ACCESS_KEY").ok(),
        };

        let strict_email = match env::var("INTAKE_STRICT_EMAIL") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "INTAKE_STRICT_EMAIL",
            })?,
            Err(_) => false,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            backend,
            intake: IntakeConfig { strict_email },
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Validation switches for the intake forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntakeConfig {
    pub strict_email: bool,
}

/// Raw connection parameters for the remote data store, as found in the environment.
#[derive(Clone, Default)]
pub struct BackendConfig {
    pub endpoint_url: Option<String>,
    pub access_key: Option<String>,
}

impl BackendConfig {
    pub fn new(endpoint_url: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            endpoint_url: Some(endpoint_url.into()),
            access_key: Some(access_key.into()),
        }
    }

    /// Resolve both parameters, rejecting absent or blank values before any connection attempt.
    pub fn settings(&self) -> Result<BackendSettings, ConfigurationError> {
        let endpoint_url = required("BACKEND_ENDPOINT_URL", self.endpoint_url.as_deref())?;
        let access_key = required("BACKEND_ACCESS_KEY", self.access_key.as_deref())?;
        Ok(BackendSettings {
            endpoint_url,
            access_key,
        })
    }
}

fn required(name: &'static str, value: Option<&str>) -> Result<String, ConfigurationError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ConfigurationError::MissingParameter { name }),
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Validated connection parameters handed to a client connector.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub endpoint_url: String,
    pub access_key: String,
}

impl fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSettings")
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// Backend parameters missing at startup. Fatal for the forms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{name} must be set to a non-empty value")]
    MissingParameter { name: &'static str },
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { name } => write!(f, "{name} must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidFlag { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
