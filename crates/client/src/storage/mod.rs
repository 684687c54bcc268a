//! Durable key-value storage.
//!
//! A [`PersistentStore`] is a scoped map from string keys to JSON text that
//! survives process restarts. Each manager owns one key and mirrors its
//! in-memory state into it after every mutation:
//!
//! | Key | Owner | Value |
//! |---|---|---|
//! | [`keys::SHOPPING_CART`] | [`crate::CartManager`] | `{"shoppingCart": [...], "lastModified": millis}` |
//! | [`keys::USER`] | [`crate::SessionManager`] | `{"user": {...}}` |
//! | [`keys::IMAGES`] | [`crate::ImageStore`] | `{"images": [...]}` |
//! | [`keys::SESSION_COOKIE`] | [`crate::SessionManager`] | `"sid=..."` |
//!
//! The stored copy has no identity of its own: it is read once at startup
//! and overwritten on every commit. [`PersistentStore::clear`] wipes every
//! key in the scope, which is what logout does.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys.
pub mod keys {
    /// Key for the shopping cart snapshot.
    pub const SHOPPING_CART: &str = "shoppingCart";

    /// Key for the authenticated user.
    pub const USER: &str = "user";

    /// Key for the product image catalog.
    pub const IMAGES: &str = "images";

    /// Key for the backend session cookie.
    pub const SESSION_COOKIE: &str = "sessionCookie";
}

/// Errors that can occur when reading or writing the store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded or decoded.
    #[error("invalid JSON under key '{key}': {source}")]
    Serialization {
        /// Key being read or written.
        key: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// The key contains characters the backend cannot store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A durable, scoped key-value store.
///
/// Implementations must be safe to share between managers; writes are
/// synchronous so a returned `Ok` means the value is durable.
pub trait PersistentStore: Send + Sync {
    /// Read the raw value under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Delete every key in this store's scope.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Typed JSON access on top of any [`PersistentStore`].
pub trait StoreExt {
    /// Read and decode the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored text is not a valid
    /// `T`, or any error from the backend.
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError>;

    /// Encode `value` and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the backend write fails.
    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError>;
}

impl<S: PersistentStore + ?Sized> StoreExt for S {
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.get(key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Serialization {
                key: key.to_string(),
                source,
            })
    }

    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &raw)
    }
}
