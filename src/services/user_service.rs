use sqlx::types::Json;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::user::{AccountState, ProfileResponse, SyncAccountRequest, UpdateProfileRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
};

pub async fn find_user_by_email(pool: &DbPool, email: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn get_account(pool: &DbPool, auth: &AuthUser) -> AppResult<ApiResponse<AccountState>> {
    let user = find_user_by_email(pool, &auth.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let data = AccountState {
        email: user.email,
        cart: user.cart.0.normalize(),
        wishlist: user.wishlist.0.normalize(),
    };
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

/// Full-state replace of cart and/or wishlist. Last writer wins across
/// devices; there is no merge.
pub async fn sync_account(
    pool: &DbPool,
    auth: &AuthUser,
    payload: SyncAccountRequest,
) -> AppResult<ApiResponse<AccountState>> {
    if payload.cart.is_none() && payload.wishlist.is_none() {
        return Err(AppError::BadRequest("Nothing to update".into()));
    }

    let user = find_user_by_email(pool, &auth.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let cart = match payload.cart {
        Some(cart) => {
            let cart = cart.normalize();
            sqlx::query("UPDATE users SET cart = $2 WHERE id = $1")
                .bind(user.id)
                .bind(Json(&cart))
                .execute(pool)
                .await?;
            cart
        }
        None => user.cart.0.normalize(),
    };

    let wishlist = match payload.wishlist {
        Some(wishlist) => {
            let wishlist = wishlist.normalize();
            sqlx::query("UPDATE users SET wishlist = $2 WHERE id = $1")
                .bind(user.id)
                .bind(Json(&wishlist))
                .execute(pool)
                .await?;
            wishlist
        }
        None => user.wishlist.0.normalize(),
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.id),
        "account_sync",
        Some("users"),
        Some(serde_json::json!({ "items": cart.items.len(), "saved": wishlist.items.len() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = AccountState {
        email: user.email,
        cart,
        wishlist,
    };
    Ok(ApiResponse::success("Updated", data, Some(Meta::empty())))
}

pub async fn get_profile(pool: &DbPool, auth: &AuthUser) -> AppResult<ApiResponse<ProfileResponse>> {
    let user = find_user_by_email(pool, &auth.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let data = ProfileResponse {
        email: user.email,
        name: user.name,
        phone: user.phone,
        addresses: user.addresses.0,
    };
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

pub async fn update_profile(
    pool: &DbPool,
    auth: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let new_email = payload.new_email.filter(|e| !e.trim().is_empty());
    if new_email.is_none()
        && payload.name.is_none()
        && payload.phone.is_none()
        && payload.addresses.is_none()
    {
        return Err(AppError::BadRequest("No changes".into()));
    }

    let user = find_user_by_email(pool, &auth.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if let Some(email) = &new_email {
        if *email != user.email && find_user_by_email(pool, email).await?.is_some() {
            return Err(AppError::Conflict("Email is already taken".into()));
        }
    }

    let email = new_email.unwrap_or_else(|| user.email.clone());
    let name = payload.name.unwrap_or_else(|| user.name.clone());
    let phone = payload.phone.unwrap_or_else(|| user.phone.clone());
    let addresses = payload.addresses.unwrap_or_else(|| user.addresses.0.clone());

    sqlx::query("UPDATE users SET email = $2, name = $3, phone = $4, addresses = $5 WHERE id = $1")
        .bind(user.id)
        .bind(&email)
        .bind(&name)
        .bind(&phone)
        .bind(Json(&addresses))
        .execute(pool)
        .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.id),
        "profile_update",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = ProfileResponse {
        email,
        name,
        phone,
        addresses,
    };
    Ok(ApiResponse::success("Profile updated", data, Some(Meta::empty())))
}
