use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Product;

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}
