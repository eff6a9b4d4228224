//! Checkout and order history.
//!
//! Orders are only available to signed-in users; the UI routes anonymous
//! visitors to sign-in before calling anything here.

use thiserror::Error;
use tracing::{debug, instrument};

use amastore_core::{OrderId, Price, UserId};

use crate::models::{Order, Product};
use crate::cart::CartState;
use crate::supabase::{NewOrderLine, OrdersApi, SupabaseError};

/// Errors from checkout and history.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Backend(#[from] SupabaseError),

    /// Checkout was attempted with nothing to buy.
    #[error("cannot place an empty order")]
    EmptyOrder,
}

/// Checkout and order history service.
#[derive(Clone)]
pub struct OrderService {
    orders: OrdersApi,
}

impl OrderService {
    #[must_use]
    pub const fn new(orders: OrdersApi) -> Self {
        Self { orders }
    }

    /// Place an order for the full contents of a cart.
    ///
    /// Unit prices are captured from the cart's product records at call
    /// time; later catalog edits do not rewrite history.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyOrder` for an empty cart, or a backend
    /// error if either insert fails.
    #[instrument(skip(self, cart), fields(user = %user, lines = cart.lines().len()))]
    pub async fn place_order(
        &self,
        user: UserId,
        cart: &CartState,
    ) -> Result<OrderId, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let lines: Vec<NewOrderLine> = cart
            .lines()
            .iter()
            .map(|line| NewOrderLine {
                product_id: line.product.id,
                quantity: line.quantity,
                price: line.product.price,
            })
            .collect();

        let order_id = self.orders.create(user, cart.subtotal(), &lines).await?;
        Ok(order_id)
    }

    /// Place a single-product order (the "buy now" button).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyOrder` for a zero quantity, or a backend
    /// error if either insert fails.
    #[instrument(skip(self, product), fields(user = %user, product = %product.id, quantity))]
    pub async fn buy_now(
        &self,
        user: UserId,
        product: &Product,
        quantity: u32,
    ) -> Result<OrderId, OrderError> {
        if quantity == 0 {
            return Err(OrderError::EmptyOrder);
        }

        let line = NewOrderLine {
            product_id: product.id,
            quantity,
            price: product.price,
        };
        let total: Price = product.price * quantity;

        let order_id = self.orders.create(user, total, &[line]).await?;
        Ok(order_id)
    }

    /// A user's orders, newest first, with product display data joined in.
    ///
    /// Items whose product has since been deleted are dropped from the
    /// view; the order totals are untouched.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the query fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn history(&self, user: UserId) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.orders.list_for_user(user).await?;
        drop_orphaned_items(&mut orders);
        Ok(orders)
    }
}

/// Drop items whose product record no longer exists.
fn drop_orphaned_items(orders: &mut [Order]) {
    for order in orders {
        let before = order.items.len();
        order.items.retain(|item| item.product.is_some());
        if order.items.len() != before {
            debug!(order = %order.id, "dropped order items referencing deleted products");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::state::tests::earbuds;

    #[test]
    fn test_orphaned_items_are_dropped_from_history() {
        let json = r#"[{
            "id": "11111111-2222-3333-4444-555555555555",
            "user_id": "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee",
            "total": 69.99,
            "status": "pending",
            "order_items": [
                {
                    "id": "99999999-8888-7777-6666-555555555551",
                    "product_id": "e89c02a4-8f4d-308c-5d8c-5ab8d77c13a4",
                    "quantity": 1,
                    "price": 59.99,
                    "products": {"name": "Wireless Bluetooth Earbuds", "image": null}
                },
                {
                    "id": "99999999-8888-7777-6666-555555555552",
                    "product_id": "d45a23c6-7d4e-8f9a-2b3c-5d7e9f8a1b2c",
                    "quantity": 1,
                    "price": 10.00,
                    "products": null
                }
            ]
        }]"#;

        let mut orders: Vec<Order> = serde_json::from_str(json).unwrap();
        drop_orphaned_items(&mut orders);

        assert_eq!(orders[0].items.len(), 1);
        assert_eq!(
            orders[0].items[0].product.as_ref().unwrap().name,
            "Wireless Bluetooth Earbuds"
        );
        // The stored total is history; dropping a view item never edits it.
        assert_eq!(orders[0].total, amastore_core::Price::from_cents(6999));
    }

    #[test]
    fn test_order_lines_capture_cart_prices() {
        let mut cart = CartState::empty();
        cart.add_one(earbuds());
        cart.add_one(earbuds());

        let lines: Vec<NewOrderLine> = cart
            .lines()
            .iter()
            .map(|line| NewOrderLine {
                product_id: line.product.id,
                quantity: line.quantity,
                price: line.product.price,
            })
            .collect();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].price, earbuds().price);
        assert_eq!(cart.subtotal(), earbuds().price * 2);
    }
}
