use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};

use crate::{
    dto::auth::{AuthResponse, GoogleCallbackQuery, LoginRequest, RegisterRequest},
    error::AppResult,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/google", get(google))
        .route("/google/callback", get(google_callback))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Missing email or password"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let resp = auth_service::register_user(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let resp = auth_service::login_user(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/auth/google",
    responses(
        (status = 303, description = "Redirect to the Google consent screen"),
        (status = 404, description = "Google sign-in not configured"),
    ),
    tag = "Auth"
)]
pub async fn google(State(state): State<AppState>) -> AppResult<Redirect> {
    let url = auth_service::google_authorize_url(&state)?;
    Ok(Redirect::to(&url))
}

#[utoipa::path(
    get,
    path = "/api/auth/google/callback",
    params(
        ("code" = String, Query, description = "Authorization code"),
        ("state" = String, Query, description = "Signed state from the authorize step"),
    ),
    responses(
        (status = 303, description = "Redirect to the frontend with a session token"),
        (status = 401, description = "Invalid sign-in state"),
        (status = 502, description = "Provider unreachable"),
    ),
    tag = "Auth"
)]
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
) -> AppResult<Redirect> {
    let url = auth_service::google_callback(&state, query).await?;
    Ok(Redirect::to(&url))
}
