//! Request bodies for the backend API.

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};

use crate::models::CartItem;

/// Body of `POST /api/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
}

/// Body of `POST /api/register`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub phone_number: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Serialize)]
pub struct CheckoutOrder<'a> {
    /// Cart lines being purchased.
    pub cart: &'a [CartItem],
    /// Order subtotal, sent as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Write a secret as a plain JSON string. Only used for request bodies.
pub(crate) fn serialize_secret<S: Serializer>(
    secret: &SecretString,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Optional variant of [`serialize_secret`].
pub(crate) fn serialize_optional_secret<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serialize_secret(secret, serializer),
        None => serializer.serialize_none(),
    }
}
