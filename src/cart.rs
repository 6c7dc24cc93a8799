use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ProductSnapshot;

/// One cart line: the product snapshot plus a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub image: String,
    pub unit: String,
    pub price: i64,
    pub quantity: i32,
}

impl CartItem {
    fn new(product: ProductSnapshot) -> Self {
        Self {
            id: product.id,
            name: product.name,
            category: product.category,
            image: product.image,
            unit: product.unit,
            price: product.price,
            quantity: 1,
        }
    }
}

/// Ordered list of cart lines with derived totals.
///
/// `total` and `item_count` are serialized with the items so the persisted
/// document is self-describing, but they are recomputed from the item list on
/// every transition and never trusted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total: i64,
    pub item_count: i64,
}

impl Default for Cart {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            item_count: 0,
        }
    }
}

impl Cart {
    /// Bulk load: lines with a non-positive quantity are dropped and the
    /// totals are rederived, whatever the caller claimed they were.
    pub fn load(items: Vec<CartItem>) -> Self {
        let mut cart = Self {
            items,
            total: 0,
            item_count: 0,
        };
        cart.items.retain(|item| item.quantity > 0);
        cart.recompute();
        cart
    }

    /// Re-derive totals from a deserialized document.
    pub fn normalize(self) -> Self {
        Self::load(self.items)
    }

    /// Add one unit: increments the existing line or appends a new one with
    /// quantity 1.
    pub fn add(&mut self, product: ProductSnapshot) {
        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => item.quantity += 1,
            None => self.items.push(CartItem::new(product)),
        }
        self.recompute();
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.items.retain(|item| item.id != product_id);
        self.recompute();
    }

    /// Set an absolute quantity; zero or below removes the line.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: i32) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.id == product_id) {
            item.quantity = quantity;
        }
        self.recompute();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn recompute(&mut self) {
        self.total = self
            .items
            .iter()
            .map(|item| item.price * item.quantity as i64)
            .sum();
        self.item_count = self.items.iter().map(|item| item.quantity as i64).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: Uuid, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            id,
            name: "Terracotta Vase".into(),
            category: "pottery".into(),
            image: "/images/vase.jpg".into(),
            unit: "piece".into(),
            price,
        }
    }

    fn assert_invariants(cart: &Cart) {
        let total: i64 = cart
            .items
            .iter()
            .map(|item| item.price * item.quantity as i64)
            .sum();
        let count: i64 = cart.items.iter().map(|item| item.quantity as i64).sum();
        assert_eq!(cart.total, total);
        assert_eq!(cart.item_count, count);
    }

    #[test]
    fn add_new_product_appends_with_quantity_one() {
        let mut cart = Cart::default();
        cart.add(snapshot(Uuid::new_v4(), 45000));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 1);
        assert_eq!(cart.total, 45000);
        assert_eq!(cart.item_count, 1);
    }

    #[test]
    fn add_existing_product_increments_quantity() {
        let id = Uuid::new_v4();
        let mut cart = Cart::default();
        cart.add(snapshot(id, 45000));
        cart.add(snapshot(id, 45000));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.total, 90000);
        assert_eq!(cart.item_count, 2);
    }

    #[test]
    fn set_quantity_zero_or_below_removes_line() {
        let id = Uuid::new_v4();
        let mut cart = Cart::default();
        cart.add(snapshot(id, 45000));

        cart.set_quantity(id, 0);
        assert!(cart.is_empty());
        assert_eq!(cart.total, 0);

        cart.add(snapshot(id, 45000));
        cart.set_quantity(id, -3);
        assert!(cart.is_empty());
        assert_eq!(cart.item_count, 0);
    }

    #[test]
    fn remove_drops_only_the_matching_line() {
        let keep = Uuid::new_v4();
        let drop = Uuid::new_v4();
        let mut cart = Cart::default();
        cart.add(snapshot(keep, 12000));
        cart.add(snapshot(drop, 8000));

        cart.remove(drop);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].id, keep);
        assert_eq!(cart.total, 12000);
    }

    #[test]
    fn totals_hold_across_mixed_operation_sequences() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let mut cart = Cart::default();

        cart.add(snapshot(a, 5000));
        assert_invariants(&cart);
        cart.add(snapshot(b, 12500));
        assert_invariants(&cart);
        cart.add(snapshot(a, 5000));
        assert_invariants(&cart);
        cart.set_quantity(b, 7);
        assert_invariants(&cart);
        cart.add(snapshot(c, 300));
        assert_invariants(&cart);
        cart.remove(a);
        assert_invariants(&cart);
        cart.set_quantity(c, 0);
        assert_invariants(&cart);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total, 7 * 12500);
        assert_eq!(cart.item_count, 7);

        cart.clear();
        assert!(cart.is_empty());
        assert_invariants(&cart);
    }

    #[test]
    fn load_discards_client_totals_and_dead_lines() {
        let id = Uuid::new_v4();
        let mut stale = CartItem::new(snapshot(id, 2000));
        stale.quantity = 3;
        let mut dead = CartItem::new(snapshot(Uuid::new_v4(), 999));
        dead.quantity = 0;

        let cart = Cart {
            items: vec![stale, dead],
            total: 1,
            item_count: 99,
        }
        .normalize();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total, 6000);
        assert_eq!(cart.item_count, 3);
    }
}
