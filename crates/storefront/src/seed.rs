//! Idempotent sample-catalog seeding.
//!
//! A fresh backend project has an empty `products` table; seeding fills it
//! with a small sample catalog so the storefront has something to show.
//! Seeding is a no-op whenever any product already exists - it never merges
//! into or overwrites a live catalog.

use tracing::{info, instrument};

use amastore_core::Price;

use crate::models::NewProduct;
use crate::supabase::{ProductsApi, SupabaseError};

/// Outcome of a seeding pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The table was empty and the sample catalog was inserted.
    Seeded { count: usize },
    /// Products already exist; nothing was written.
    AlreadyPopulated,
}

/// Seed the sample catalog if the products table is empty.
///
/// # Errors
///
/// Returns an error if the existence check or the insert fails.
#[instrument(skip(products))]
pub async fn seed_products(products: &ProductsApi) -> Result<SeedOutcome, SupabaseError> {
    if products.any_exist().await? {
        info!("catalog already has products; skipping seed");
        return Ok(SeedOutcome::AlreadyPopulated);
    }

    let catalog = sample_catalog();
    let count = catalog.len();
    info!(count, "catalog empty; inserting sample products");
    products.create_many(&catalog).await?;

    Ok(SeedOutcome::Seeded { count })
}

/// The built-in sample catalog.
///
/// IDs are fixed so reseeding a wiped table produces the same rows.
#[must_use]
pub fn sample_catalog() -> Vec<NewProduct> {
    fn entry(
        id: &str,
        name: &str,
        description: &str,
        cents: i64,
        rating: f64,
        reviews: i64,
        category: &str,
        image: &str,
        featured: bool,
    ) -> NewProduct {
        NewProduct {
            id: id.parse().ok(),
            name: name.to_string(),
            description: Some(description.to_string()),
            price: Price::from_cents(cents),
            rating: Some(rating),
            reviews: Some(reviews),
            category: category.to_string(),
            image: Some(image.to_string()),
            featured,
        }
    }

    vec![
        entry(
            "e89c02a4-8f4d-308c-5d8c-5ab8d77c13a4",
            "Wireless Bluetooth Earbuds",
            "High-quality sound with noise cancellation technology for an immersive listening experience.",
            5999,
            4.5,
            120,
            "Electronics",
            "https://images.unsplash.com/photo-1590658268037-6bf12165a8df",
            true,
        ),
        entry(
            "f72c11b4-5e4d-9a8a-3c5b-3a9f6d2e5b4c",
            "Smart Home Assistant",
            "Voice-controlled smart assistant with integrated smart home controls and entertainment features.",
            12999,
            4.7,
            85,
            "Electronics",
            "https://images.unsplash.com/photo-1512446816042-444d641267d4",
            false,
        ),
        entry(
            "d45a23c6-7d4e-8f9a-2b3c-5d7e9f8a1b2c",
            "Ergonomic Office Chair",
            "Comfortable and adjustable office chair with lumbar support for long working hours.",
            19999,
            4.3,
            62,
            "Home & Office",
            "https://images.unsplash.com/photo-1579486599420-03f77e2e4e39",
            false,
        ),
        entry(
            "a18b45d2-9c3e-7f6a-1d2b-4c6e8a0f2d4b",
            "Stainless Steel Cookware Set",
            "Durable ten-piece cookware set suitable for all stovetops, dishwasher safe.",
            14999,
            4.6,
            48,
            "Kitchen",
            "https://images.unsplash.com/photo-1584990347449-a43d9c0a6f15",
            true,
        ),
        entry(
            "b29c56e3-0d4f-8a7b-2e3c-5d7f9b1a3e5c",
            "Insulated Water Bottle",
            "Keeps drinks cold for 24 hours or hot for 12, with a leak-proof lid.",
            2499,
            4.8,
            230,
            "Sports & Outdoors",
            "https://images.unsplash.com/photo-1602143407151-7111542de6e8",
            false,
        ),
        entry(
            "c30d67f4-1e5a-9b8c-3f4d-6e8a0c2b4f6d",
            "Classic Board Game Collection",
            "Family collection of five timeless board games in one storage box.",
            3999,
            4.4,
            77,
            "Toys & Games",
            "https://images.unsplash.com/photo-1606503153255-59d8b8b82176",
            false,
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_catalog_ids_are_fixed_and_unique() {
        let catalog = sample_catalog();
        let ids: HashSet<_> = catalog.iter().map(|p| p.id.unwrap()).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_sample_catalog_uses_known_categories() {
        for product in sample_catalog() {
            assert!(
                crate::catalog::CATEGORIES.contains(&product.category.as_str()),
                "unknown category {}",
                product.category
            );
        }
    }

    #[test]
    fn test_sample_catalog_has_featured_products() {
        assert!(sample_catalog().iter().any(|p| p.featured));
    }
}
