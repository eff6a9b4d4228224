//! Product catalog browsing.
//!
//! Thin view-shaping over [`ProductsApi`]: the backend answers the category
//! query, and search text plus sort order are applied in memory, exactly as
//! the product grid expects them. Empty result sets are not errors.

use tracing::instrument;

use amastore_core::ProductId;

use crate::models::Product;
use crate::supabase::{ProductsApi, SupabaseError};

/// The fixed category list the storefront navigates by.
pub const CATEGORIES: &[&str] = &[
    "Electronics",
    "Home & Office",
    "Kitchen",
    "Furniture",
    "Sports & Outdoors",
    "Books",
    "Toys & Games",
];

/// Sort orders offered by the product grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// Featured products first (the grid's default).
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    Rating,
}

/// A catalog browse request.
#[derive(Debug, Clone, Default)]
pub struct BrowseQuery {
    /// Restrict to one category; `None` browses everything.
    pub category: Option<String>,
    /// Case-insensitive text search over name, description, and category.
    pub search: Option<String>,
    pub sort: ProductSort,
}

/// Catalog browsing service.
#[derive(Clone)]
pub struct CatalogService {
    products: ProductsApi,
}

impl CatalogService {
    #[must_use]
    pub const fn new(products: ProductsApi) -> Self {
        Self { products }
    }

    /// Browse the catalog with filtering, search, and sort applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, query), fields(category = ?query.category, search = ?query.search))]
    pub async fn browse(&self, query: &BrowseQuery) -> Result<Vec<Product>, SupabaseError> {
        let mut products = self.products.list(query.category.as_deref()).await?;

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            products.retain(|product| matches_search(product, &needle));
        }

        sort_products(&mut products, query.sort);
        Ok(products)
    }

    /// Products for the featured shelf on the landing page.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn featured(&self) -> Result<Vec<Product>, SupabaseError> {
        self.products.featured().await
    }

    /// A single product's detail record.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` for an unknown ID.
    pub async fn get(&self, id: ProductId) -> Result<Product, SupabaseError> {
        self.products.get(id).await
    }
}

fn matches_search(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || product.category.to_lowercase().contains(needle)
}

fn sort_products(products: &mut [Product], sort: ProductSort) {
    match sort {
        ProductSort::Featured => {
            // Stable sort keeps the backend's newest-first order within
            // each group.
            products.sort_by_key(|p| !p.is_featured());
        }
        ProductSort::PriceAsc => products.sort_by_key(|p| p.price),
        ProductSort::PriceDesc => {
            products.sort_by_key(|p| std::cmp::Reverse(p.price));
        }
        ProductSort::Rating => {
            products.sort_by(|a, b| {
                let ra = a.rating.unwrap_or(0.0);
                let rb = b.rating.unwrap_or(0.0);
                rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use amastore_core::Price;

    fn product(name: &str, cents: i64, rating: Option<f64>, featured: bool) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_string(),
            description: Some(format!("{name} description")),
            price: Price::from_cents(cents),
            rating,
            reviews: None,
            category: "Electronics".to_string(),
            image: None,
            featured: Some(featured),
            created_at: None,
        }
    }

    #[test]
    fn test_search_matches_name_case_insensitive() {
        let p = product("Wireless Earbuds", 5999, None, false);
        assert!(matches_search(&p, "wireless"));
        assert!(matches_search(&p, "earbuds"));
        assert!(!matches_search(&p, "chair"));
    }

    #[test]
    fn test_search_matches_category() {
        let p = product("Desk Lamp", 1999, None, false);
        assert!(matches_search(&p, "electronics"));
    }

    #[test]
    fn test_sort_featured_first_is_stable() {
        let mut products = vec![
            product("a", 100, None, false),
            product("b", 200, None, true),
            product("c", 300, None, false),
            product("d", 400, None, true),
        ];
        sort_products(&mut products, ProductSort::Featured);

        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["b", "d", "a", "c"]);
    }

    #[test]
    fn test_sort_by_price() {
        let mut products = vec![
            product("mid", 200, None, false),
            product("cheap", 100, None, false),
            product("dear", 300, None, false),
        ];

        sort_products(&mut products, ProductSort::PriceAsc);
        assert_eq!(products[0].name, "cheap");

        sort_products(&mut products, ProductSort::PriceDesc);
        assert_eq!(products[0].name, "dear");
    }

    #[test]
    fn test_sort_by_rating_treats_missing_as_zero() {
        let mut products = vec![
            product("unrated", 100, None, false),
            product("good", 100, Some(4.5), false),
            product("ok", 100, Some(3.0), false),
        ];

        sort_products(&mut products, ProductSort::Rating);
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["good", "ok", "unrated"]);
    }
}
