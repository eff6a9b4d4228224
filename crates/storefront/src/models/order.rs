//! Order and order-item models.

use amastore_core::{OrderId, OrderItemId, Price, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
    /// Statuses introduced server-side that this build does not know about.
    #[serde(other)]
    Unknown,
}

/// An order as stored in the `orders` table, with its items embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "order_items")]
    pub items: Vec<OrderItem>,
}

/// One line of an order, joined with display data for its product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price at purchase time, not the product's current price.
    pub price: Price,
    /// Joined product display data; `None` when the product has since been
    /// deleted (the referential-gap case).
    #[serde(default, rename = "products")]
    pub product: Option<OrderProductInfo>,
}

/// The slice of product data joined into order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProductInfo {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Order {
    /// Total quantity across all items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
