use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::Cart;
use crate::wishlist::Wishlist;

/// Full user row. Not serialized directly; responses go through DTOs.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Option<String>,
    pub name: String,
    pub phone: String,
    pub addresses: Json<Vec<Address>>,
    pub cart: Json<Cart>,
    pub wishlist: Json<Wishlist>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub image: String,
    pub unit: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub description: Option<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

/// The slice of a product that carts, wishlists and orders embed. Captured at
/// add time; later catalog edits do not rewrite it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub image: String,
    pub unit: String,
    pub price: i64,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
            unit: product.unit.clone(),
            price: product.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub name: String,
    pub phone: String,
    pub pincode: String,
    pub line: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cod,
    Card,
    Upi,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cod => "cod",
            PaymentMode::Card => "card",
            PaymentMode::Upi => "upi",
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<crate::cart::CartItem>,
    pub total: i64,
    pub address: Address,
    pub payment_mode: String,
    pub payment_status: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
