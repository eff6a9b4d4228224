//! Cart items table API.
//!
//! One row per (user, product) pair. Quantities live here; product display
//! data is joined in separately during cart hydration.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use amastore_core::{ProductId, UserId};

use super::SupabaseError;
use super::client::{SupabaseClient, eq_filter};

const TABLE: &str = "cart_items";

/// A row of the `cart_items` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemRow {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// API for the `cart_items` table.
#[derive(Clone)]
pub struct CartItemsApi {
    client: SupabaseClient,
}

impl CartItemsApi {
    /// Create a new cart items API over a shared client.
    #[must_use]
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Fetch all cart rows for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn for_user(&self, user: UserId) -> Result<Vec<CartItemRow>, SupabaseError> {
        let user_filter = eq_filter(user);
        self.client
            .select(TABLE, &[("select", "*"), ("user_id", &user_filter)])
            .await
    }

    /// Insert-or-update cart rows for a user.
    ///
    /// Merges on `(user_id, product_id)`, so replaying the same rows is
    /// idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the rows.
    #[instrument(skip(self, lines), fields(user = %user, count = lines.len()))]
    pub async fn upsert_lines(
        &self,
        user: UserId,
        lines: &[(ProductId, u32)],
    ) -> Result<(), SupabaseError> {
        if lines.is_empty() {
            return Ok(());
        }

        let rows: Vec<CartItemRow> = lines
            .iter()
            .map(|&(product_id, quantity)| CartItemRow {
                user_id: user,
                product_id,
                quantity,
            })
            .collect();

        self.client
            .upsert(TABLE, "user_id,product_id", &rows)
            .await
    }

    /// Delete one cart row.
    ///
    /// Deleting a row that does not exist is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the delete.
    #[instrument(skip(self), fields(user = %user, product = %product))]
    pub async fn delete_line(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<(), SupabaseError> {
        let user_filter = eq_filter(user);
        let product_filter = eq_filter(product);
        self.client
            .delete(
                TABLE,
                &[("user_id", &user_filter), ("product_id", &product_filter)],
            )
            .await
    }

    /// Delete every cart row for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the delete.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn clear(&self, user: UserId) -> Result<(), SupabaseError> {
        let user_filter = eq_filter(user);
        self.client
            .delete(TABLE, &[("user_id", &user_filter)])
            .await
    }
}
