//! Product identifiers.
//!
//! The backend hands out product IDs either as JSON numbers or as strings
//! depending on where the product came from. [`ProductId`] keeps whichever
//! form was received so that a value read from storage serializes back
//! byte-for-byte.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque product identifier.
///
/// Two IDs are equal only if both the form and the value match: `42` and
/// `"42"` are different products.
///
/// ```
/// use shopfront_core::ProductId;
///
/// let numeric: ProductId = serde_json::from_str("42").unwrap();
/// let text: ProductId = serde_json::from_str("\"sku-42\"").unwrap();
///
/// assert_eq!(numeric, ProductId::from(42_i64));
/// assert_eq!(text, ProductId::from("sku-42"));
/// assert_ne!(ProductId::from(42_i64), ProductId::from("42"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    /// Numeric ID (e.g., an auto-increment key).
    Numeric(i64),
    /// String ID (e.g., a document key or SKU).
    Text(String),
}

impl ProductId {
    /// Parse an ID typed by a user: all-digit input becomes numeric.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        s.parse::<i64>()
            .map_or_else(|_| Self::Text(s.to_owned()), Self::Numeric)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}
