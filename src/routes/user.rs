use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::user::{AccountState, ProfileResponse, SyncAccountRequest, UpdateProfileRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(account).patch(sync_account))
        .route("/profile", get(profile).patch(update_profile))
}

#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Cart and wishlist for the current user", body = ApiResponse<AccountState>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn account(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AccountState>>> {
    let resp = user_service::get_account(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/user",
    request_body = SyncAccountRequest,
    responses(
        (status = 200, description = "Replace cart and/or wishlist", body = ApiResponse<AccountState>),
        (status = 400, description = "Neither cart nor wishlist supplied"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn sync_account(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SyncAccountRequest>,
) -> AppResult<Json<ApiResponse<AccountState>>> {
    let resp = user_service::sync_account(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "Profile for the current user", body = ApiResponse<ProfileResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProfileResponse>>> {
    let resp = user_service::get_profile(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/user/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Update profile fields", body = ApiResponse<ProfileResponse>),
        (status = 400, description = "No changes"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Email already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<ProfileResponse>>> {
    let resp = user_service::update_profile(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}
