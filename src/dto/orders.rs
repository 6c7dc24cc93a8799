use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Address, Order, PaymentMode};

/// Gateway confirmation handed back by the hosted checkout widget.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GatewayPayment {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub address: Option<Address>,
    pub payment_mode: PaymentMode,
    /// Required for gateway-based modes, ignored for cash on delivery.
    pub payment: Option<GatewayPayment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub order_id: Uuid,
    pub payment_status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
