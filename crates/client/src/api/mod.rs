//! Storefront backend API.
//!
//! # Endpoints
//!
//! | Method | Path | Body | Response |
//! |---|---|---|---|
//! | POST | `/api/login` | [`LoginRequest`] | [`User`] |
//! | POST | `/api/register` | [`RegisterRequest`] | [`User`] |
//! | POST | `/api/logout` | - | - |
//! | POST | `/api/edit-profile` | [`ProfilePatch`] | - |
//! | GET | `/api/product-images` | - | `[ProductImage]` |
//! | POST | `/api/checkout` | [`CheckoutOrder`] | - |
//!
//! The managers only see the [`ApiClient`] trait; [`HttpApiClient`] is the
//! production implementation.

#[cfg(test)]
pub(crate) mod fake;
mod http;
pub mod types;

pub use http::HttpApiClient;
pub use types::{CheckoutOrder, LoginRequest, RegisterRequest};

use async_trait::async_trait;
use thiserror::Error;

use crate::error::ErrorKind;
use crate::models::{ProductImage, ProfilePatch, User};

/// Endpoint paths, relative to the configured base URL.
pub mod endpoints {
    pub const LOGIN: &str = "api/login";
    pub const REGISTER: &str = "api/register";
    pub const LOGOUT: &str = "api/logout";
    pub const EDIT_PROFILE: &str = "api/edit-profile";
    pub const PRODUCT_IMAGES: &str = "api/product-images";
    pub const CHECKOUT: &str = "api/checkout";
}

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection or protocol failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("request to {0} timed out")]
    Timeout(String),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of a rejected request.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the backend refused the request itself (4xx),
    /// e.g. a taken username or an item that is no longer available.
    ///
    /// Retrying a conflict unchanged will fail again; anything else may
    /// succeed on retry.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status >= 400 && *status < 500)
    }

    /// Classify as [`ErrorKind::Conflict`] or [`ErrorKind::Transient`].
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        if self.is_conflict() {
            ErrorKind::Conflict
        } else {
            ErrorKind::Transient
        }
    }
}

/// Remote operations used by the managers.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Authenticate and return the user record.
    async fn login(&self, request: &LoginRequest) -> Result<User, ApiError>;

    /// Create an account and return the user record.
    async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError>;

    /// End the server-side session.
    async fn logout(&self) -> Result<(), ApiError>;

    /// Apply a sparse profile update.
    async fn edit_profile(&self, patch: &ProfilePatch) -> Result<(), ApiError>;

    /// Fetch every product image.
    async fn product_images(&self) -> Result<Vec<ProductImage>, ApiError>;

    /// Place an order for the given cart.
    async fn checkout(&self, order: &CheckoutOrder<'_>) -> Result<(), ApiError>;

    /// `Cookie` header value for the backend session, if one is held.
    fn session_cookie(&self) -> Option<String> {
        None
    }

    /// Send `cookie` (a value returned by [`ApiClient::session_cookie`]) with
    /// every later request.
    fn resume_session(&self, _cookie: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 403,
            message: "Username already exists".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 403: Username already exists");

        let err = ApiError::Timeout("http://localhost/api/login".to_string());
        assert_eq!(
            err.to_string(),
            "request to http://localhost/api/login timed out"
        );
    }

    #[test]
    fn test_conflict_classification() {
        let conflict = ApiError::Status {
            status: 409,
            message: String::new(),
        };
        assert!(conflict.is_conflict());
        assert_eq!(conflict.status(), Some(409));

        let server = ApiError::Status {
            status: 502,
            message: String::new(),
        };
        assert!(!server.is_conflict());

        assert!(!ApiError::Timeout(String::new()).is_conflict());
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert_eq!(server.kind(), ErrorKind::Transient);
        assert_eq!(ApiError::Timeout(String::new()).status(), None);
    }
}
