//! Typed client for the hosted Supabase backend.
//!
//! # Architecture
//!
//! - Supabase is the source of truth - NO local sync, direct REST calls
//! - Requests follow the PostgREST conventions the backend exposes
//!   (`?column=eq.value` filters, `Prefer` headers, embedded selects)
//! - In-memory caching via `moka` for product reads (5 minute TTL)
//!
//! # Tables
//!
//! - `products` - catalog rows, admin CRUD
//! - `cart_items` - one row per (user, product) cart line
//! - `orders` / `order_items` - checkout history
//!
//! # Example
//!
//! ```rust,ignore
//! use amastore_storefront::supabase::{ProductsApi, SupabaseClient};
//!
//! let client = SupabaseClient::new(&config.supabase);
//! let products = ProductsApi::new(client.clone());
//!
//! let featured = products.featured().await?;
//! let one = products.get(product_id).await?;
//! ```

mod cart_items;
mod client;
mod orders;
mod products;

pub use cart_items::{CartItemRow, CartItemsApi};
pub use client::SupabaseClient;
pub use orders::{NewOrderLine, OrdersApi};
pub use products::ProductsApi;

use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supabase_error_display() {
        let err = SupabaseError::NotFound("product e89c02a4".to_string());
        assert_eq!(err.to_string(), "Not found: product e89c02a4");

        let err = SupabaseError::Api {
            status: 503,
            message: "upstream unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error (503): upstream unavailable");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = SupabaseError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
