//! Session error types.

use thiserror::Error;

use shopfront_core::PhoneNumberError;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The phone number in a profile edit is not an accepted format.
    /// Raised before anything is sent.
    #[error("invalid phone number: {0}")]
    InvalidPhoneNumber(#[from] PhoneNumberError),

    /// The operation needs a logged-in user.
    #[error("not logged in")]
    NotAuthenticated,

    /// The backend refused the request (4xx): wrong credentials, a taken
    /// username, or an invalid field.
    #[error("request rejected (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Backend's explanation.
        message: String,
    },

    /// The request failed for another reason (network, timeout, 5xx).
    #[error("API error: {0}")]
    Api(ApiError),

    /// Reading or writing the stored session failed.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<ApiError> for SessionError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Status { status, message } if (400..500).contains(&status) => {
                Self::Rejected { status, message }
            }
            other => Self::Api(other),
        }
    }
}
