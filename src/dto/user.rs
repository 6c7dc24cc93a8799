use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{cart::Cart, models::Address, wishlist::Wishlist};

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountState {
    pub email: String,
    pub cart: Cart,
    pub wishlist: Wishlist,
}

/// Full-state replace: whichever of the two is present overwrites the stored
/// copy wholesale. Totals in the submitted cart are ignored and rederived.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SyncAccountRequest {
    pub cart: Option<Cart>,
    pub wishlist: Option<Wishlist>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub addresses: Vec<Address>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub new_email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    /// Whole-array replace; the client edits entries by index.
    pub addresses: Option<Vec<Address>>,
}
