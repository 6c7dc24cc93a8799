use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentOrderRequest {
    /// Minor units (paise).
    pub amount: i64,
    /// Defaults to INR.
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentOrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    /// Public key id the checkout widget needs.
    pub key_id: String,
}
