//! In-memory cart state.
//!
//! `CartState` is a plain value: the orchestrator clones it, applies a
//! transition, writes the candidate through to the backing store, and only
//! then commits it. Nothing here does I/O.
//!
//! Invariants:
//! - at most one line per product
//! - every line has quantity >= 1 (a line reaching 0 is deleted)

use amastore_core::{Price, ProductId};
use serde::{Deserialize, Serialize};

use crate::models::Product;

/// One product-quantity pairing within the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity
    }
}

/// Ordered collection of cart lines, unique by product ID.
///
/// Serializes as a bare line array, which is also the local snapshot
/// format: `[{"product":{…},"quantity":3}]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build state from lines, merging duplicates and dropping zero
    /// quantities.
    ///
    /// Used when loading from a backing store we do not control; committed
    /// state already holds the invariants.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut state = Self::empty();
        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            if let Some(existing) = state.line_mut(line.product.id) {
                existing.quantity += line.quantity;
                continue;
            }
            state.lines.push(line);
        }
        state
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, product: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Add one unit of a product: increment an existing line or insert a
    /// new line with quantity 1.
    pub fn add_one(&mut self, product: Product) {
        if let Some(line) = self.line_mut(product.id) {
            line.quantity += 1;
            return;
        }
        self.lines.push(CartLine {
            product,
            quantity: 1,
        });
    }

    /// Remove the line for a product. Returns whether a line existed.
    pub fn remove(&mut self, product: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product.id != product);
        self.lines.len() != before
    }

    /// Set the quantity of an existing line. Quantity 0 removes the line.
    ///
    /// Returns whether the state changed; setting a quantity on a product
    /// that has no line is a no-op, never an insert.
    pub fn set_quantity(&mut self, product: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product);
        }
        if let Some(line) = self.line_mut(product) {
            line.quantity = quantity;
            return true;
        }
        false
    }

    fn line_mut(&mut self, product: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.product.id == product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use amastore_core::Price;

    pub(crate) fn product(id: &str, name: &str, cents: i64) -> Product {
        Product {
            id: id.parse().unwrap(),
            name: name.to_string(),
            description: None,
            price: Price::from_cents(cents),
            rating: None,
            reviews: None,
            category: "Electronics".to_string(),
            image: None,
            featured: None,
            created_at: None,
        }
    }

    pub(crate) fn earbuds() -> Product {
        product(
            "e89c02a4-8f4d-308c-5d8c-5ab8d77c13a4",
            "Wireless Bluetooth Earbuds",
            5999,
        )
    }

    pub(crate) fn chair() -> Product {
        product(
            "d45a23c6-7d4e-8f9a-2b3c-5d7e9f8a1b2c",
            "Ergonomic Office Chair",
            19999,
        )
    }

    #[test]
    fn test_add_one_inserts_then_increments() {
        let mut state = CartState::empty();
        state.add_one(earbuds());
        assert_eq!(state.lines().len(), 1);
        assert_eq!(state.get(earbuds().id).unwrap().quantity, 1);

        state.add_one(earbuds());
        assert_eq!(state.lines().len(), 1);
        assert_eq!(state.get(earbuds().id).unwrap().quantity, 2);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut state = CartState::empty();
        state.add_one(earbuds());
        assert!(state.set_quantity(earbuds().id, 0));
        assert!(state.is_empty());
    }

    #[test]
    fn test_set_quantity_missing_is_noop() {
        let mut state = CartState::empty();
        state.add_one(earbuds());
        assert!(!state.set_quantity(chair().id, 5));
        assert_eq!(state.lines().len(), 1);
    }

    #[test]
    fn test_remove_missing_reports_false() {
        let mut state = CartState::empty();
        assert!(!state.remove(earbuds().id));
        assert!(state.is_empty());
    }

    #[test]
    fn test_totals() {
        let mut state = CartState::empty();
        state.add_one(earbuds());
        state.add_one(earbuds());
        state.add_one(chair());

        assert_eq!(state.item_count(), 3);
        assert_eq!(state.subtotal(), Price::from_cents(5999 * 2 + 19999));
    }

    #[test]
    fn test_from_lines_merges_duplicates_and_drops_zeroes() {
        let state = CartState::from_lines(vec![
            CartLine {
                product: earbuds(),
                quantity: 1,
            },
            CartLine {
                product: chair(),
                quantity: 0,
            },
            CartLine {
                product: earbuds(),
                quantity: 2,
            },
        ]);

        assert_eq!(state.lines().len(), 1);
        assert_eq!(state.get(earbuds().id).unwrap().quantity, 3);
    }

    #[test]
    fn test_invariants_hold_for_any_op_sequence() {
        let mut state = CartState::empty();
        let ops: &[&dyn Fn(&mut CartState)] = &[
            &|s| s.add_one(earbuds()),
            &|s| s.add_one(chair()),
            &|s| {
                s.set_quantity(earbuds().id, 7);
            },
            &|s| {
                s.remove(chair().id);
            },
            &|s| s.add_one(chair()),
            &|s| {
                s.set_quantity(chair().id, 0);
            },
            &|s| s.add_one(earbuds()),
        ];

        for op in ops {
            op(&mut state);

            let mut seen = std::collections::HashSet::new();
            for line in state.lines() {
                assert!(line.quantity >= 1, "zero-quantity line stored");
                assert!(seen.insert(line.product.id), "duplicate product line");
            }
        }
    }

    #[test]
    fn test_snapshot_format_round_trip() {
        let mut state = CartState::empty();
        state.add_one(earbuds());

        let json = serde_json::to_value(&state).unwrap();
        assert!(json.is_array(), "snapshot must be a bare line array");
        assert_eq!(json[0]["quantity"], 1);
        assert_eq!(json[0]["product"]["name"], "Wireless Bluetooth Earbuds");

        let back: CartState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
