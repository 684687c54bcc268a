//! Product image types.

use serde::{Deserialize, Serialize};

use shopfront_core::ProductId;

/// Image for one product, as served by `/api/product-images`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub product_id: ProductId,
    /// Encoded image, typically a base64 data URL.
    pub image_data: String,
}

/// Persisted image catalog: `{"images": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCatalog {
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

impl ImageCatalog {
    /// Image data for `product_id`, or `""` when the product has no image.
    #[must_use]
    pub fn find(&self, product_id: &ProductId) -> &str {
        self.images
            .iter()
            .find(|image| &image.product_id == product_id)
            .map_or("", |image| image.image_data.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_returns_empty_for_unknown_product() {
        let catalog = ImageCatalog {
            images: vec![ProductImage {
                product_id: ProductId::from(3_i64),
                image_data: "data:image/png;base64,AAAA".to_string(),
            }],
        };

        assert_eq!(
            catalog.find(&ProductId::from(3_i64)),
            "data:image/png;base64,AAAA"
        );
        assert_eq!(catalog.find(&ProductId::from(4_i64)), "");
        assert_eq!(catalog.find(&ProductId::from("3")), "");
    }
}
