use axum::{Json, Router, extract::State, routing::post};

use crate::{
    audit::log_audit,
    dto::payment::{CreatePaymentOrderRequest, PaymentOrderResponse},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    payment,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/order", post(create_payment_order))
}

#[utoipa::path(
    post,
    path = "/api/payment/order",
    request_body = CreatePaymentOrderRequest,
    responses(
        (status = 200, description = "Hosted checkout order created at the gateway", body = ApiResponse<PaymentOrderResponse>),
        (status = 400, description = "Invalid amount"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Payment gateway not configured"),
        (status = 502, description = "Gateway unreachable"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn create_payment_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePaymentOrderRequest>,
) -> AppResult<Json<ApiResponse<PaymentOrderResponse>>> {
    if payload.amount <= 0 {
        return Err(AppError::BadRequest("amount must be greater than 0".into()));
    }

    let gateway = state
        .config
        .razorpay
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Payment gateway is not configured".into()))?;

    let currency = payload.currency.unwrap_or_else(|| "INR".to_string());
    let order = payment::create_checkout_order(gateway, payload.amount, &currency).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "payment_order_created",
        Some("payment"),
        Some(serde_json::json!({ "gateway_order_id": order.order_id, "amount": order.amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = PaymentOrderResponse {
        order_id: order.order_id,
        amount: order.amount,
        currency: order.currency,
        key_id: gateway.key_id.clone(),
    };
    Ok(Json(ApiResponse::success("OK", data, Some(Meta::empty()))))
}
