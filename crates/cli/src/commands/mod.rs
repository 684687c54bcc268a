//! Command implementations.

pub mod account;
pub mod cart;
pub mod images;

use std::sync::Arc;

use thiserror::Error;

use shopfront_client::api::{ApiClient, ApiError, HttpApiClient};
use shopfront_client::config::{ClientConfig, ConfigError};
use shopfront_client::storage::{FileStore, PersistentStore, StorageError};
use shopfront_client::{
    CartError, ClientError, ImageError, SessionError, resume_backend_session,
};
use shopfront_core::PriceError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The client library failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A price argument could not be parsed.
    #[error("Invalid price: {0}")]
    Price(#[from] PriceError),

    /// An argument failed local validation.
    #[error("Invalid {field}: {value}")]
    InvalidArgument {
        field: &'static str,
        value: String,
    },
}

impl CliError {
    /// Report client failures through [`ClientError::report`].
    ///
    /// Returns the Sentry event ID when the error was captured (and already
    /// logged at error level).
    pub fn report(&self) -> Option<sentry::types::Uuid> {
        match self {
            Self::Client(e) => e.report(),
            Self::Price(_) | Self::InvalidArgument { .. } => None,
        }
    }
}

macro_rules! via_client_error {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for CliError {
                fn from(error: $source) -> Self {
                    Self::Client(ClientError::from(error))
                }
            }
        )+
    };
}

via_client_error!(ConfigError, ApiError, StorageError, CartError, SessionError, ImageError);

/// Store and backend shared by every command.
pub struct Context {
    pub store: Arc<dyn PersistentStore>,
    pub api: Arc<dyn ApiClient>,
}

impl Context {
    /// Open the configured store and build the HTTP client, resuming the
    /// backend session a previous `login` left behind.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Client` if the store directory cannot be created,
    /// the stored session cookie cannot be read, or the HTTP client cannot
    /// be built.
    pub fn new(config: &ClientConfig) -> Result<Self, CliError> {
        let store = FileStore::new(&config.storage.dir, &config.storage.namespace)?;
        tracing::debug!(dir = %store.dir().display(), "opened store");
        let api = HttpApiClient::new(&config.api)?;
        if resume_backend_session(&store, &api)? {
            tracing::debug!("resumed backend session");
        }

        Ok(Self {
            store: Arc::new(store),
            api: Arc::new(api),
        })
    }
}
