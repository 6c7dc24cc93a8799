use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    cart::Cart,
    dto::orders::{OrderList, PlaceOrderRequest, PlaceOrderResponse},
    entity::orders::{
        ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, PaymentMode},
    payment,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::user_service::find_user_by_email,
    state::AppState,
};

/// Convert the user's cart into an order. Gateway modes must carry a
/// verifiable payment signature; nothing is persisted on a mismatch.
pub async fn place_order(
    state: &AppState,
    auth: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<PlaceOrderResponse>> {
    let user = find_user_by_email(&state.pool, &auth.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let address = payload
        .address
        .ok_or_else(|| AppError::BadRequest("Delivery address is required".into()))?;

    let cart = user.cart.0.clone().normalize();
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let payment_status = match payload.payment_mode {
        PaymentMode::Cod => "success",
        PaymentMode::Card | PaymentMode::Upi => {
            let confirmation = payload
                .payment
                .as_ref()
                .ok_or_else(|| AppError::BadRequest("Payment not verified".into()))?;
            let gateway = state
                .config
                .razorpay
                .as_ref()
                .ok_or_else(|| AppError::NotFound("Payment gateway is not configured".into()))?;
            if !payment::verify_payment_signature(
                &gateway.key_secret,
                &confirmation.order_id,
                &confirmation.payment_id,
                &confirmation.signature,
            ) {
                return Err(AppError::BadRequest("Invalid payment signature".into()));
            }
            "success"
        }
    };

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        items: Set(serde_json::to_value(&cart.items)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?),
        total: Set(cart.total),
        address: Set(serde_json::to_value(&address)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?),
        payment_mode: Set(payload.payment_mode.as_str().to_string()),
        payment_status: Set(payment_status.to_string()),
        status: Set("placed".to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    // Separate write, not a transaction: if it fails the order stays placed
    // and the stale cart wins until the next sync.
    sqlx::query("UPDATE users SET cart = $2 WHERE id = $1")
        .bind(user.id)
        .bind(Json(Cart::default()))
        .execute(&state.pool)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "order_placed",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "total": order.total,
            "payment_mode": order.payment_mode,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let resp = PlaceOrderResponse {
        order_id: order.id,
        payment_status: payment_status.to_string(),
    };
    Ok(ApiResponse::success("Order placed", resp, Some(Meta::empty())))
}

pub async fn order_history(
    state: &AppState,
    auth: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Orders::find()
        .filter(OrderCol::UserId.eq(auth.user_id))
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", OrderList { items: orders }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(auth.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

    Ok(ApiResponse::success(
        "OK",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        items: serde_json::from_value(model.items)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?,
        total: model.total,
        address: serde_json::from_value(model.address)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?,
        payment_mode: model.payment_mode,
        payment_status: model.payment_status,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
