//! Product catalog models.
//!
//! Rows come back from the hosted backend as JSON; nullable columns map to
//! `Option` fields so a sparse admin-entered product still deserializes.

use amastore_core::{Price, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product as stored in the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews: Option<i64>,
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Whether the product is flagged for the featured shelf.
    #[must_use]
    pub fn is_featured(&self) -> bool {
        self.featured.unwrap_or(false)
    }
}

/// Payload for inserting a product.
///
/// The backend generates the ID unless one is supplied (the seed catalog
/// ships fixed IDs so reseeding stays idempotent).
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<i64>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub featured: bool,
}

/// Partial update for a product; only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl ProductPatch {
    /// Whether the patch carries any change at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.image.is_none()
            && self.featured.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_with_nulls() {
        let json = r#"{
            "id": "e89c02a4-8f4d-308c-5d8c-5ab8d77c13a4",
            "name": "Wireless Bluetooth Earbuds",
            "description": null,
            "price": 59.99,
            "category": "Electronics",
            "image": null,
            "featured": null
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.name, "Wireless Bluetooth Earbuds");
        assert_eq!(product.price, Price::from_cents(5999));
        assert!(!product.is_featured());
        assert!(product.rating.is_none());
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = ProductPatch {
            image: Some("https://images.example.com/earbuds.jpg".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(&patch).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert!(obj.contains_key("image"));
    }

    #[test]
    fn test_empty_patch() {
        assert!(ProductPatch::default().is_empty());
    }
}
