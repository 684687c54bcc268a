//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPFRONT_API_BASE_URL` - Base URL of the storefront backend (e.g., `https://shop.example.com`)
//!
//! ## Optional
//! - `SHOPFRONT_STORAGE_DIR` - Directory for persisted state (default: `.shopfront`)
//! - `SHOPFRONT_STORAGE_NAMESPACE` - Subdirectory scoping this client's keys (default: `shopfront`)
//! - `SHOPFRONT_REQUEST_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_DIR: &str = ".shopfront";
const DEFAULT_STORAGE_NAMESPACE: &str = "shopfront";
const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shopfront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Persistent store configuration
    pub storage: StorageConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
}

/// Backend API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; always ends with `/` so relative endpoints keep its path.
    pub base_url: Url,
    /// Upper bound on each request, connect through body.
    pub request_timeout: Duration,
}

/// Persistent store configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for persisted state.
    pub dir: PathBuf,
    /// Namespace directory under `dir`.
    pub namespace: String,
}

impl ClientConfig {
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

        Ok(Self {
            api: ApiConfig::from_env()?,
            storage: StorageConfig::from_env(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(&get_required_env("SHOPFRONT_API_BASE_URL")?)?;
        let timeout_secs = get_env_or_default(
            "SHOPFRONT_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        );
        let request_timeout = parse_timeout(&timeout_secs)?;

        Ok(Self {
            base_url,
            request_timeout,
        })
    }
}

impl StorageConfig {
    fn from_env() -> Self {
        Self {
            dir: PathBuf::from(get_env_or_default(
                "SHOPFRONT_STORAGE_DIR",
                DEFAULT_STORAGE_DIR,
            )),
            namespace: get_env_or_default(
                "SHOPFRONT_STORAGE_NAMESPACE",
                DEFAULT_STORAGE_NAMESPACE,
            ),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the backend base URL, appending a trailing slash if missing.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the value is not an http(s) URL.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid =
        |reason: String| ConfigError::InvalidEnvVar("SHOPFRONT_API_BASE_URL".to_string(), reason);

    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::InvalidEnvVar("SHOPFRONT_REQUEST_TIMEOUT_SECS".to_string(), reason)
    };

    let secs = raw.parse::<u64>().map_err(|e| invalid(e.to_string()))?;
    if secs == 0 {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(Duration::from_secs(secs))
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
