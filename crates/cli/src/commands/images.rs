//! Product image cache commands.

use shopfront_client::ImageStore;
use shopfront_core::ProductId;

use super::{CliError, Context};

fn open(ctx: &Context) -> Result<ImageStore, CliError> {
    let mut images = ImageStore::new(ctx.store.clone(), ctx.api.clone());
    images.restore_image_state()?;
    Ok(images)
}

/// Download all product images into the cache.
pub async fn fetch(ctx: &Context) -> Result<(), CliError> {
    let mut images = ImageStore::new(ctx.store.clone(), ctx.api.clone());
    let count = images.fetch_images().await?;
    tracing::info!("Cached {count} product image(s)");
    Ok(())
}

/// Print a product's cached image data.
pub fn find(ctx: &Context, product_id: &str) -> Result<(), CliError> {
    let images = open(ctx)?;
    let data = images.find_image(&ProductId::parse_lenient(product_id));
    if data.is_empty() {
        tracing::info!("No image for {product_id}");
    } else {
        tracing::info!("{data}");
    }
    Ok(())
}

/// Drop all cached images.
pub fn clear(ctx: &Context) -> Result<(), CliError> {
    let mut images = open(ctx)?;
    images.reset_image_state()?;
    tracing::info!("Image cache cleared");
    Ok(())
}
