use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::user::AccountState;

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountState,
}

/// Shared by both accepted token formats: session-issued and API-issued.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GoogleCallbackQuery {
    pub code: String,
    pub state: String,
}
