//! Shopping cart state manager.
//!
//! The cart lives in memory and is mirrored to the store under
//! [`keys::SHOPPING_CART`] after every mutation. On startup
//! [`CartManager::restore_cart_state`] adopts the stored cart only if it was
//! modified less than [`CART_EXPIRATION_HOURS`] ago; older carts are
//! discarded.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut cart = CartManager::new(store, api);
//! cart.restore_cart_state()?;
//!
//! cart.add_product_to_cart(CartItem::new(42_i64, 1))?;
//! cart.purchase_items(Price::parse("19.99")?).await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use shopfront_core::{Price, ProductId};

use crate::api::{ApiClient, ApiError, CheckoutOrder};
use crate::error::add_breadcrumb;
use crate::models::{CartItem, CartState};
use crate::storage::{PersistentStore, StorageError, StoreExt, keys};
use crate::time::{SystemTimeSource, TimeSource};

/// Hours a stored cart stays restorable after its last modification.
pub const CART_EXPIRATION_HOURS: i64 = 12;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// A line must hold at least one unit.
    #[error("quantity must be at least 1 for product {0}")]
    InvalidQuantity(ProductId),

    /// Reading or writing the stored cart failed.
    #[error("cart storage error: {0}")]
    Storage(#[from] StorageError),

    /// The backend did not accept the order.
    #[error("checkout failed: {0}")]
    Checkout(#[from] ApiError),
}

/// What [`CartManager::restore_cart_state`] found in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing was stored; the cart stays empty.
    NotFound,
    /// The stored cart was fresh and is now in memory.
    Restored {
        /// Number of lines adopted.
        lines: usize,
    },
    /// The stored cart was too old (or never modified) and was reset.
    Expired,
}

/// Owns the in-memory cart and keeps the stored copy in step.
pub struct CartManager {
    store: Arc<dyn PersistentStore>,
    api: Arc<dyn ApiClient>,
    clock: Arc<dyn TimeSource>,
    state: CartState,
}

impl CartManager {
    /// Create an empty cart using wall-clock time.
    #[must_use]
    pub fn new(store: Arc<dyn PersistentStore>, api: Arc<dyn ApiClient>) -> Self {
        Self::with_time_source(store, api, Arc::new(SystemTimeSource))
    }

    /// Create an empty cart with an explicit time source.
    #[must_use]
    pub fn with_time_source(
        store: Arc<dyn PersistentStore>,
        api: Arc<dyn ApiClient>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store,
            api,
            clock,
            state: CartState::default(),
        }
    }

    /// Current cart state.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.state.items
    }

    /// Time of the last add, remove, or reset that set a timestamp.
    #[must_use]
    pub const fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.state.last_modified
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.state.total_quantity()
    }

    /// Load the stored cart if it is still within the expiration window.
    ///
    /// A stored cart without a timestamp is never considered fresh.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the stored cart cannot be read or
    /// decoded, or if resetting an expired cart cannot be written.
    #[instrument(skip(self))]
    pub fn restore_cart_state(&mut self) -> Result<RestoreOutcome, CartError> {
        let Some(stored) = self.store.load_json::<CartState>(keys::SHOPPING_CART)? else {
            debug!("no stored cart");
            return Ok(RestoreOutcome::NotFound);
        };

        if is_fresh(stored.last_modified, self.clock.now()) {
            let lines = stored.items.len();
            self.state = stored;
            debug!(lines, "restored cart");
            Ok(RestoreOutcome::Restored { lines })
        } else {
            info!(
                last_modified = ?stored.last_modified,
                "stored cart expired, resetting"
            );
            self.reset_cart_state()?;
            Ok(RestoreOutcome::Expired)
        }
    }

    /// Add a product, merging with an existing line for the same product.
    ///
    /// A merge only increases the existing line's quantity; its other fields
    /// are left as they were. Either way the timestamp is updated and the
    /// cart is saved, so merged quantities survive a restart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a zero quantity and
    /// `CartError::Storage` if the cart cannot be saved.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, quantity = item.quantity_purchased))]
    pub fn add_product_to_cart(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.quantity_purchased == 0 {
            return Err(CartError::InvalidQuantity(item.product_id));
        }

        let product_id = item.product_id.to_string();
        if let Some(existing) = self
            .state
            .items
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            existing.quantity_purchased = existing
                .quantity_purchased
                .saturating_add(item.quantity_purchased);
            debug!(quantity = existing.quantity_purchased, "merged into existing line");
        } else {
            self.state.items.push(item);
            debug!(lines = self.state.items.len(), "appended line");
        }

        add_breadcrumb(
            "cart",
            "Added product to cart",
            Some(&[("product_id", product_id.as_str())]),
        );
        self.touch_and_save()
    }

    /// Remove the line for `product_id`.
    ///
    /// The timestamp is updated and the cart saved even when no line
    /// matched. Returns whether a line was removed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be saved.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product_from_cart(&mut self, product_id: &ProductId) -> Result<bool, CartError> {
        let removed = match self.state.position(product_id) {
            Some(index) => {
                self.state.items.remove(index);
                true
            }
            None => false,
        };
        debug!(removed, "remove from cart");

        add_breadcrumb(
            "cart",
            "Removed product from cart",
            Some(&[("product_id", product_id.to_string().as_str())]),
        );
        self.touch_and_save()?;
        Ok(removed)
    }

    /// Submit the cart to checkout and empty it on success.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Checkout` with the backend's error unchanged if
    /// the order is refused (for example an item sold out meanwhile) or the
    /// request fails; the cart is left as it was. Returns
    /// `CartError::Storage` if the emptied cart cannot be saved.
    #[instrument(skip(self), fields(lines = self.state.items.len(), subtotal = %subtotal))]
    pub async fn purchase_items(&mut self, subtotal: Price) -> Result<(), CartError> {
        let order = CheckoutOrder {
            cart: &self.state.items,
            total: subtotal.amount,
        };

        if let Err(e) = self.api.checkout(&order).await {
            warn!(error = %e, conflict = e.is_conflict(), "checkout failed");
            return Err(e.into());
        }

        info!("checkout complete");
        add_breadcrumb("cart", "Checked out", None);
        self.reset_cart_state()
    }

    /// Empty the cart, clear the timestamp, and save.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be saved.
    pub fn reset_cart_state(&mut self) -> Result<(), CartError> {
        self.state = CartState::default();
        self.save_cart_state()
    }

    /// Write the current cart to the store.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the write fails.
    pub fn save_cart_state(&self) -> Result<(), CartError> {
        self.store.save_json(keys::SHOPPING_CART, &self.state)?;
        Ok(())
    }

    fn touch_and_save(&mut self) -> Result<(), CartError> {
        self.state.last_modified = Some(self.clock.now());
        self.save_cart_state()
    }
}

fn expiration() -> TimeDelta {
    TimeDelta::hours(CART_EXPIRATION_HOURS)
}

/// A cart is fresh if it was modified less than the expiration window ago.
///
/// Timestamps in the future (clock skew) count as fresh.
fn is_fresh(last_modified: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    last_modified.is_some_and(|modified| now - modified < expiration())
}
