//! Cart backing stores.
//!
//! The cart has exactly one authoritative store at a time, chosen by
//! identity: the backend's `cart_items` table for a signed-in user, the
//! local snapshot for an anonymous session. Both sit behind [`CartStore`]
//! so the orchestrator selects a store once per identity instead of
//! branching at every call site.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use amastore_core::{ProductId, UserId};

use super::local::{CART_KEY, CacheError, KeyValueCache};
use super::state::{CartLine, CartState};
use crate::supabase::{CartItemsApi, ProductsApi, SupabaseError};

/// Errors from a cart backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The hosted backend rejected or failed a request.
    #[error("remote cart store error: {0}")]
    Remote(#[from] SupabaseError),

    /// The local cache could not be read or written.
    #[error("local cart cache error: {0}")]
    Local(#[from] CacheError),

    /// The cart snapshot could not be serialized.
    #[error("cart snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// A backing store holding the authoritative copy of the cart.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Load the full cart state.
    async fn load(&self) -> Result<CartState, StoreError>;

    /// Persist the full cart state (write-through after a mutation).
    async fn save(&self, state: &CartState) -> Result<(), StoreError>;

    /// Delete the entry for one product.
    async fn remove(&self, product: ProductId) -> Result<(), StoreError>;

    /// Delete everything.
    async fn clear(&self) -> Result<(), StoreError>;
}

// =============================================================================
// Remote store (signed-in users)
// =============================================================================

/// Cart store backed by the backend's `cart_items` table.
///
/// Loading joins cart rows with their product records; a row whose product
/// no longer exists is silently dropped.
pub struct RemoteCartStore {
    items: CartItemsApi,
    products: ProductsApi,
    user: UserId,
}

impl RemoteCartStore {
    #[must_use]
    pub const fn new(items: CartItemsApi, products: ProductsApi, user: UserId) -> Self {
        Self {
            items,
            products,
            user,
        }
    }
}

#[async_trait]
impl CartStore for RemoteCartStore {
    #[instrument(skip(self), fields(user = %self.user))]
    async fn load(&self) -> Result<CartState, StoreError> {
        let rows = self.items.for_user(self.user).await?;
        if rows.is_empty() {
            return Ok(CartState::empty());
        }

        let ids: Vec<ProductId> = rows.iter().map(|row| row.product_id).collect();
        let products = self.products.by_ids(&ids).await?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            match products.iter().find(|p| p.id == row.product_id) {
                Some(product) => lines.push(CartLine {
                    product: product.clone(),
                    quantity: row.quantity,
                }),
                None => {
                    // Referential gap: the product was deleted out from
                    // under the cart row.
                    debug!(product = %row.product_id, "dropping cart line; product no longer exists");
                }
            }
        }

        Ok(CartState::from_lines(lines))
    }

    async fn save(&self, state: &CartState) -> Result<(), StoreError> {
        let lines: Vec<(ProductId, u32)> = state
            .lines()
            .iter()
            .map(|line| (line.product.id, line.quantity))
            .collect();

        self.items.upsert_lines(self.user, &lines).await?;
        Ok(())
    }

    async fn remove(&self, product: ProductId) -> Result<(), StoreError> {
        self.items.delete_line(self.user, product).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.items.clear(self.user).await?;
        Ok(())
    }
}

// =============================================================================
// Local store (anonymous sessions)
// =============================================================================

/// Cart store backed by the local snapshot cache.
///
/// Every write persists the full state under the `"cart"` key; there are no
/// partial writes. An unparsable snapshot loads as an empty cart.
pub struct LocalCartStore {
    cache: Arc<dyn KeyValueCache>,
}

impl LocalCartStore {
    #[must_use]
    pub fn new(cache: Arc<dyn KeyValueCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl CartStore for LocalCartStore {
    async fn load(&self) -> Result<CartState, StoreError> {
        let Some(raw) = self.cache.get(CART_KEY)? else {
            return Ok(CartState::empty());
        };

        match serde_json::from_str::<Vec<CartLine>>(&raw) {
            Ok(lines) => Ok(CartState::from_lines(lines)),
            Err(e) => {
                warn!(error = %e, "local cart snapshot unparsable; starting empty");
                Ok(CartState::empty())
            }
        }
    }

    async fn save(&self, state: &CartState) -> Result<(), StoreError> {
        let snapshot = serde_json::to_string(state)?;
        self.cache.set(CART_KEY, &snapshot)?;
        Ok(())
    }

    async fn remove(&self, product: ProductId) -> Result<(), StoreError> {
        let mut state = self.load().await?;
        if state.remove(product) {
            self.save(&state).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.save(&CartState::empty()).await
    }
}
