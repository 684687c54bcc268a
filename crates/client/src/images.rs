//! Product image store.
//!
//! Images are fetched once from the backend and kept under
//! [`keys::IMAGES`], so later runs can resolve them without a request.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use shopfront_core::ProductId;

use crate::api::{ApiClient, ApiError};
use crate::models::{ImageCatalog, ProductImage};
use crate::storage::{PersistentStore, StorageError, StoreExt, keys};

/// Errors that can occur in image operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Fetching the images failed.
    #[error("image fetch failed: {0}")]
    Api(#[from] ApiError),

    /// Reading or writing the stored images failed.
    #[error("image storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Cached product images.
pub struct ImageStore {
    store: Arc<dyn PersistentStore>,
    api: Arc<dyn ApiClient>,
    catalog: ImageCatalog,
}

impl ImageStore {
    /// Create an empty image store.
    #[must_use]
    pub fn new(store: Arc<dyn PersistentStore>, api: Arc<dyn ApiClient>) -> Self {
        Self {
            store,
            api,
            catalog: ImageCatalog::default(),
        }
    }

    /// Images currently held.
    #[must_use]
    pub fn images(&self) -> &[ProductImage] {
        &self.catalog.images
    }

    /// Load previously fetched images from the store.
    ///
    /// Returns `false` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Storage` if the stored catalog cannot be read.
    pub fn restore_image_state(&mut self) -> Result<bool, ImageError> {
        match self.store.load_json::<ImageCatalog>(keys::IMAGES)? {
            Some(catalog) => {
                debug!(count = catalog.images.len(), "restored images");
                self.catalog = catalog;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fetch all product images and replace the held set.
    ///
    /// On failure the held images are kept as they were.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Api` if the request fails and
    /// `ImageError::Storage` if the result cannot be saved.
    #[instrument(skip(self))]
    pub async fn fetch_images(&mut self) -> Result<usize, ImageError> {
        let images = self.api.product_images().await.map_err(|e| {
            warn!(error = %e, "failed to fetch product images");
            e
        })?;

        let count = images.len();
        self.catalog.images = images;
        self.save_image_state()?;
        debug!(count, "fetched product images");
        Ok(count)
    }

    /// Drop all held images.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Storage` if the empty catalog cannot be saved.
    pub fn reset_image_state(&mut self) -> Result<(), ImageError> {
        self.catalog = ImageCatalog::default();
        self.save_image_state()
    }

    /// Write the held images to the store.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Storage` if the write fails.
    pub fn save_image_state(&self) -> Result<(), ImageError> {
        self.store.save_json(keys::IMAGES, &self.catalog)?;
        Ok(())
    }

    /// Image data for `product_id`, or `""` when it has none.
    #[must_use]
    pub fn find_image(&self, product_id: &ProductId) -> &str {
        self.catalog.find(product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeApi};
    use crate::storage::MemoryStore;

    fn image(id: i64, data: &str) -> ProductImage {
        ProductImage {
            product_id: ProductId::from(id),
            image_data: data.to_string(),
        }
    }

    fn setup() -> (Arc<MemoryStore>, Arc<FakeApi>, ImageStore) {
        let store = Arc::new(MemoryStore::new());
        let api = Arc::new(FakeApi::default());
        api.respond_with_images(vec![image(1, "data:a"), image(2, "data:b")]);
        let images = ImageStore::new(store.clone(), api.clone());
        (store, api, images)
    }

    #[tokio::test]
    async fn test_fetch_replaces_and_persists() {
        let (store, api, mut images) = setup();

        assert_eq!(images.fetch_images().await.unwrap(), 2);
        assert_eq!(images.find_image(&ProductId::from(2_i64)), "data:b");
        assert_eq!(api.calls(), vec![Call::ProductImages]);

        let stored: ImageCatalog = store.load_json(keys::IMAGES).unwrap().unwrap();
        assert_eq!(stored.images.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_held_images() {
        let (_, api, mut images) = setup();
        images.fetch_images().await.unwrap();
        api.fail_with(503);

        let err = images.fetch_images().await.unwrap_err();

        assert!(matches!(err, ImageError::Api(_)));
        assert_eq!(images.images().len(), 2);
    }

    #[tokio::test]
    async fn test_restore_after_restart() {
        let (store, api, mut images) = setup();
        images.fetch_images().await.unwrap();

        let mut reopened = ImageStore::new(store, api.clone());
        assert!(reopened.restore_image_state().unwrap());
        assert_eq!(reopened.find_image(&ProductId::from(1_i64)), "data:a");
        assert_eq!(api.calls().len(), 1);
    }

    #[test]
    fn test_restore_with_nothing_stored() {
        let (_, _, mut images) = setup();
        assert!(!images.restore_image_state().unwrap());
        assert!(images.images().is_empty());
    }

    #[tokio::test]
    async fn test_reset_empties_and_persists() {
        let (store, _, mut images) = setup();
        images.fetch_images().await.unwrap();

        images.reset_image_state().unwrap();

        assert_eq!(images.find_image(&ProductId::from(1_i64)), "");
        let stored: ImageCatalog = store.load_json(keys::IMAGES).unwrap().unwrap();
        assert!(stored.images.is_empty());
    }
}
