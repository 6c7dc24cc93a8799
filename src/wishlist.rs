use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ProductSnapshot;

/// Saved-for-later product references, unique by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Wishlist {
    pub items: Vec<ProductSnapshot>,
}

impl Wishlist {
    /// Adding a product that is already saved is a no-op.
    pub fn add(&mut self, product: ProductSnapshot) {
        if !self.contains(product.id) {
            self.items.push(product);
        }
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.items.retain(|item| item.id != product_id);
    }

    pub fn contains(&self, product_id: Uuid) -> bool {
        self.items.iter().any(|item| item.id == product_id)
    }

    /// Drop duplicate product ids from a deserialized document, keeping the
    /// first occurrence.
    pub fn normalize(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.items.len());
        self.items.retain(|item| {
            if seen.contains(&item.id) {
                false
            } else {
                seen.push(item.id);
                true
            }
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: Uuid) -> ProductSnapshot {
        ProductSnapshot {
            id,
            name: "Jute Basket".into(),
            category: "weaving".into(),
            image: "/images/basket.jpg".into(),
            unit: "piece".into(),
            price: 30000,
        }
    }

    #[test]
    fn add_is_idempotent_per_product() {
        let id = Uuid::new_v4();
        let mut wishlist = Wishlist::default();
        wishlist.add(snapshot(id));
        wishlist.add(snapshot(id));

        assert_eq!(wishlist.items.len(), 1);
        assert!(wishlist.contains(id));
    }

    #[test]
    fn remove_by_product_id() {
        let id = Uuid::new_v4();
        let mut wishlist = Wishlist::default();
        wishlist.add(snapshot(id));
        wishlist.remove(id);

        assert!(wishlist.items.is_empty());
        assert!(!wishlist.contains(id));
    }

    #[test]
    fn normalize_drops_duplicate_ids() {
        let id = Uuid::new_v4();
        let wishlist = Wishlist {
            items: vec![snapshot(id), snapshot(id), snapshot(Uuid::new_v4())],
        }
        .normalize();

        assert_eq!(wishlist.items.len(), 2);
    }
}
