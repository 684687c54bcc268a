//! Cart types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use shopfront_core::ProductId;

/// One product line in the cart.
///
/// Only the ID and quantity are interpreted; every other product field
/// (name, price, image, ...) is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product this line refers to. Unique within a cart.
    #[serde(rename = "productID")]
    pub product_id: ProductId,
    /// Units of the product in the cart.
    pub quantity_purchased: u32,
    /// Remaining product fields, passed through opaquely.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl CartItem {
    /// Create a line with no extra product fields.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, quantity_purchased: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity_purchased,
            details: Map::new(),
        }
    }

    /// Attach an extra product field.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Cart contents plus the time of the last mutation.
///
/// `last_modified` is `None` exactly when the cart has been reset and
/// nothing has been added since.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    /// Lines in insertion order.
    #[serde(rename = "shoppingCart", default)]
    pub items: Vec<CartItem>,
    /// When items were last added or removed, stored as epoch milliseconds.
    #[serde(
        rename = "lastModified",
        default,
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub last_modified: Option<DateTime<Utc>>,
}

impl CartState {
    /// Position of the line for `product_id`, if present.
    #[must_use]
    pub fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| &item.product_id == product_id)
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity_purchased))
            .sum()
    }
}
