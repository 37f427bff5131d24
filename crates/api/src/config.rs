//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MULTISHIP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `MULTISHIP_HOST` - Bind address (default: 127.0.0.1)
//! - `MULTISHIP_PORT` - Listen port (default: 3002)
//! - `MULTISHIP_API_NAMESPACE` - Route namespace prefix (default: /wc/v3)
//! - `MULTISHIP_REQUIRE_LIST_FILTER` - Refuse unfiltered list requests (default: false)
//! - `MULTISHIP_DB_MAX_CONNECTIONS` - Connection pool size (default: 10)
//! - `LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_API_NAMESPACE: &str = "/wc/v3";
const DEFAULT_PORT: &str = "3002";
const DEFAULT_MAX_CONNECTIONS: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text (local development).
    #[default]
    Text,
    /// One JSON object per event (log shippers).
    Json,
}

/// API service configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Maximum number of pooled database connections
    pub db_max_connections: u32,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Prefix the address routes are nested under, e.g. `/wc/v3`
    pub api_namespace: String,
    /// Refuse list requests that carry neither `user_id` nor `type`
    pub require_list_filter: bool,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("MULTISHIP_DATABASE_URL")?;

        let db_max_connections =
            get_env_or_default("MULTISHIP_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)
                .parse::<u32>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "MULTISHIP_DB_MAX_CONNECTIONS".to_string(),
                        e.to_string(),
                    )
                })?;

        let host = get_env_or_default("MULTISHIP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("MULTISHIP_HOST".to_string(), e.to_string()))?;

        let port = get_env_or_default("MULTISHIP_PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("MULTISHIP_PORT".to_string(), e.to_string()))?;

        let api_namespace = get_env_or_default("MULTISHIP_API_NAMESPACE", DEFAULT_API_NAMESPACE);
        validate_namespace(&api_namespace, "MULTISHIP_API_NAMESPACE")?;

        let require_list_filter = get_optional_env("MULTISHIP_REQUIRE_LIST_FILTER")
            .map(|value| parse_bool(&value, "MULTISHIP_REQUIRE_LIST_FILTER"))
            .transpose()?
            .unwrap_or(false);

        let log_format = get_optional_env("LOG_FORMAT")
            .map(|value| parse_log_format(&value))
            .transpose()?
            .unwrap_or_default();

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            db_max_connections,
            host,
            port,
            api_namespace,
            require_list_filter,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a boolean flag (`true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`).
fn parse_bool(value: &str, var_name: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "text" | "" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(ConfigError::InvalidEnvVar(
            "LOG_FORMAT".to_string(),
            format!("expected 'text' or 'json', got '{other}'"),
        )),
    }
}

/// Validate a route namespace such as `/wc/v3`.
///
/// Must start with `/`, must not end with `/`, and may only contain ASCII
/// alphanumerics and `/ - _ .`.
fn validate_namespace(namespace: &str, var_name: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| {
        Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("'{namespace}' {reason}"),
        ))
    };

    if !namespace.starts_with('/') || namespace.len() < 2 {
        return invalid("must start with '/' followed by at least one segment");
    }
    if namespace.ends_with('/') {
        return invalid("must not end with '/'");
    }
    if namespace.contains("//") {
        return invalid("must not contain empty segments");
    }
    if !namespace
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
    {
        return invalid("contains characters outside [A-Za-z0-9/-_.]");
    }

    Ok(())
}
