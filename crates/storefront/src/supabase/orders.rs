//! Orders and order items table API.
//!
//! Checkout writes two tables in sequence (an order row, then its items),
//! mirroring the backend's schema. History reads use an embedded select so
//! one request returns orders, items, and product display data.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use amastore_core::{OrderId, Price, ProductId, UserId};

use super::SupabaseError;
use super::client::{SupabaseClient, eq_filter};
use crate::models::Order;

const ORDERS_TABLE: &str = "orders";
const ITEMS_TABLE: &str = "order_items";

/// Embedded select for order history: orders with items and product info.
const HISTORY_SELECT: &str = "*,order_items(*,products(name,image))";

/// One line of a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price captured at purchase time.
    pub price: Price,
}

#[derive(Serialize)]
struct NewOrderRow {
    user_id: UserId,
    total: Price,
    status: &'static str,
}

#[derive(Deserialize)]
struct CreatedOrderRow {
    id: OrderId,
}

#[derive(Serialize)]
struct NewItemRow {
    order_id: OrderId,
    product_id: ProductId,
    quantity: u32,
    price: Price,
}

/// API for the `orders` and `order_items` tables.
#[derive(Clone)]
pub struct OrdersApi {
    client: SupabaseClient,
}

impl OrdersApi {
    /// Create a new orders API over a shared client.
    #[must_use]
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Create a pending order with its items; returns the new order ID.
    ///
    /// The two inserts are not transactional on our side; if the item
    /// insert fails the caller sees the error and the order row remains
    /// pending with no items, matching the original flow.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert is rejected.
    #[instrument(skip(self, lines), fields(user = %user, lines = lines.len()))]
    pub async fn create(
        &self,
        user: UserId,
        total: Price,
        lines: &[NewOrderLine],
    ) -> Result<OrderId, SupabaseError> {
        let mut created: Vec<CreatedOrderRow> = self
            .client
            .insert(
                ORDERS_TABLE,
                &[NewOrderRow {
                    user_id: user,
                    total,
                    status: "pending",
                }],
            )
            .await?;

        let order_id = created
            .pop()
            .ok_or_else(|| SupabaseError::NotFound("created order".to_string()))?
            .id;

        let items: Vec<NewItemRow> = lines
            .iter()
            .map(|line| NewItemRow {
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.price,
            })
            .collect();

        let _: Vec<serde_json::Value> = self.client.insert(ITEMS_TABLE, &items).await?;

        Ok(order_id)
    }

    /// Fetch a user's orders, newest first, with items and product info.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>, SupabaseError> {
        let user_filter = eq_filter(user);
        self.client
            .select(
                ORDERS_TABLE,
                &[
                    ("select", HISTORY_SELECT),
                    ("user_id", &user_filter),
                    ("order", "created_at.desc"),
                ],
            )
            .await
    }
}
