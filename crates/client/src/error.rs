//! Unified error handling with Sentry integration.
//!
//! Each manager has its own error enum; [`ClientError`] gathers them so a
//! front end can hold a single error type and decide what to show with
//! [`ClientError::kind`].

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::config::ConfigError;
use crate::images::ImageError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Broad class of a failure, for choosing how to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input was rejected locally; nothing was sent.
    Validation,
    /// The backend refused the request (4xx).
    Conflict,
    /// Network, timeout, or server failure; retrying may help.
    Transient,
    /// The persistent store could not be read or written.
    Storage,
}

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote call failed outside a manager.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Persistent store failed outside a manager.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Session operation failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Image operation failed.
    #[error("Image error: {0}")]
    Image(#[from] ImageError),
}

impl ClientError {
    /// Classify the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_)
            | Self::Cart(CartError::InvalidQuantity(_))
            | Self::Session(SessionError::InvalidPhoneNumber(_) | SessionError::NotAuthenticated) => {
                ErrorKind::Validation
            }
            Self::Api(e)
            | Self::Cart(CartError::Checkout(e))
            | Self::Session(SessionError::Api(e))
            | Self::Image(ImageError::Api(e)) => e.kind(),
            Self::Session(SessionError::Rejected { .. }) => ErrorKind::Conflict,
            Self::Storage(_)
            | Self::Cart(CartError::Storage(_))
            | Self::Session(SessionError::Storage(_))
            | Self::Image(ImageError::Storage(_)) => ErrorKind::Storage,
        }
    }

    /// Log the error and, for transient and storage failures, capture it to
    /// Sentry.
    ///
    /// Returns the Sentry event ID when the error was captured.
    pub fn report(&self) -> Option<sentry::types::Uuid> {
        match self.kind() {
            ErrorKind::Transient | ErrorKind::Storage => {
                let event_id = sentry::capture_error(self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Client error"
                );
                Some(event_id)
            }
            ErrorKind::Validation | ErrorKind::Conflict => {
                tracing::debug!(error = %self, "Client error");
                None
            }
        }
    }
}

/// Set the Sentry user context from a username.
///
/// Call this after login or registration to associate errors with users.
pub fn set_sentry_user(username: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
