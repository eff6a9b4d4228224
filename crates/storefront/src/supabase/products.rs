//! Products table API with read caching.
//!
//! Catalog reads (list, get, featured) are cached for 5 minutes via `moka`;
//! the admin CRUD paths invalidate the cache so the dashboard always sees
//! its own writes.

use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use amastore_core::ProductId;

use super::SupabaseError;
use super::client::{SupabaseClient, eq_filter, in_filter};
use crate::models::{NewProduct, Product, ProductPatch};

const TABLE: &str = "products";
const CACHE_CAPACITY: u64 = 100;
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Cached catalog values.
#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}

/// API for the `products` table.
#[derive(Clone)]
pub struct ProductsApi {
    client: SupabaseClient,
    cache: Cache<String, CacheValue>,
}

impl ProductsApi {
    /// Create a new products API over a shared client.
    #[must_use]
    pub fn new(client: SupabaseClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self { client, cache }
    }

    /// List products, optionally restricted to one category, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, SupabaseError> {
        let cache_key = format!("products:{}", category.unwrap_or("*"));

        if let Some(CacheValue::Products(products)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let category_filter = category.map(eq_filter);
        let mut filters = vec![("select", "*"), ("order", "created_at.desc")];
        if let Some(ref value) = category_filter {
            filters.push(("category", value));
        }

        let products: Vec<Product> = self.client.select(TABLE, &filters).await?;

        self.cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` if no such product exists, or
    /// another error if the request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: ProductId) -> Result<Product, SupabaseError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let id_filter = eq_filter(id);
        let mut rows: Vec<Product> = self
            .client
            .select(TABLE, &[("select", "*"), ("id", &id_filter), ("limit", "1")])
            .await?;

        let product = rows
            .pop()
            .ok_or_else(|| SupabaseError::NotFound(format!("product {id}")))?;

        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Batch-fetch products by ID.
    ///
    /// Missing IDs are simply absent from the result; callers decide what a
    /// gap means (the cart drops the referencing line).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, ids))]
    pub async fn by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, SupabaseError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_filter = in_filter(ids.iter().copied());
        self.client
            .select(TABLE, &[("select", "*"), ("id", &id_filter)])
            .await
    }

    /// List products flagged as featured.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn featured(&self) -> Result<Vec<Product>, SupabaseError> {
        let cache_key = "products:featured".to_string();

        if let Some(CacheValue::Products(products)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for featured products");
            return Ok(products);
        }

        let products: Vec<Product> = self
            .client
            .select(TABLE, &[("select", "*"), ("featured", "is.true")])
            .await?;

        self.cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Whether the catalog holds any products at all (used by seeding).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn any_exist(&self) -> Result<bool, SupabaseError> {
        #[derive(serde::Deserialize)]
        struct IdOnly {
            #[serde(rename = "id")]
            _id: ProductId,
        }

        let rows: Vec<IdOnly> = self
            .client
            .select(TABLE, &[("select", "id"), ("limit", "1")])
            .await?;

        Ok(!rows.is_empty())
    }

    // =========================================================================
    // Admin CRUD (invalidates the read cache)
    // =========================================================================

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the row or nothing comes back.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product, SupabaseError> {
        let mut rows: Vec<Product> = self.client.insert(TABLE, &[product]).await?;
        let created = rows
            .pop()
            .ok_or_else(|| SupabaseError::NotFound("created product".to_string()))?;

        self.invalidate_all().await;
        Ok(created)
    }

    /// Insert several products at once (seeding path).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the rows.
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn create_many(&self, products: &[NewProduct]) -> Result<(), SupabaseError> {
        let _: Vec<Product> = self.client.insert(TABLE, products).await?;
        self.invalidate_all().await;
        Ok(())
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the patch.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: ProductId, patch: &ProductPatch) -> Result<(), SupabaseError> {
        if patch.is_empty() {
            return Ok(());
        }

        let id_filter = eq_filter(id);
        self.client
            .update(TABLE, &[("id", &id_filter)], patch)
            .await?;

        self.invalidate_all().await;
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the delete.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<(), SupabaseError> {
        let id_filter = eq_filter(id);
        self.client.delete(TABLE, &[("id", &id_filter)]).await?;

        self.invalidate_all().await;
        Ok(())
    }

    /// Drop all cached catalog reads.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
