use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::auth::{AuthResponse, Claims, GoogleCallbackQuery, LoginRequest, RegisterRequest},
    dto::user::AccountState,
    error::{AppError, AppResult},
    models::User,
    response::{ApiResponse, Meta},
    services::user_service::find_user_by_email,
    state::AppState,
};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

pub async fn register_user(
    pool: &DbPool,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let RegisterRequest { email, password } = payload;
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("Email and password required".into()));
    }

    if find_user_by_email(pool, &email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".into()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let user: User = sqlx::query_as(
        "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(email.as_str())
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    let token = issue_token(&api_secret()?, user.id, &user.email)?;

    if let Err(err) = log_audit(
        pool,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let resp = AuthResponse {
        token,
        user: account_state(user),
    };
    Ok(ApiResponse::success("User created", resp, None))
}

pub async fn login_user(
    pool: &DbPool,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let LoginRequest { email, password } = payload;
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("Email and password required".into()));
    }

    let user = find_user_by_email(pool, &email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    // Accounts created through third-party sign-in carry no password hash.
    let stored_hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = issue_token(&api_secret()?, user.id, &user.email)?;

    if let Err(err) = log_audit(
        pool,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let resp = AuthResponse {
        token,
        user: account_state(user),
    };
    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

/// Short-lived signed state carried through the sign-in redirect; verifying
/// it on the way back is the CSRF check, no server-side storage involved.
#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    sub: String,
    exp: usize,
}

pub fn google_authorize_url(state: &AppState) -> AppResult<String> {
    let google = state
        .config
        .google
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Google sign-in is not configured".into()))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::minutes(10))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;
    let claims = StateClaims {
        sub: Uuid::new_v4().to_string(),
        exp: expiration.timestamp() as usize,
    };
    let state_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(session_secret()?.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok(format!(
        "{GOOGLE_AUTH_URL}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
        url_encode(&google.client_id),
        url_encode(&google.redirect_uri),
        url_encode("openid email profile"),
        state_token,
    ))
}

/// Exchange the callback code, upsert the user, and hand back the frontend
/// redirect carrying a session token.
pub async fn google_callback(
    state: &AppState,
    query: GoogleCallbackQuery,
) -> AppResult<String> {
    let google = state
        .config
        .google
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Google sign-in is not configured".into()))?;

    let secret = session_secret()?;
    decode::<StateClaims>(
        &query.state,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid sign-in state".into()))?;

    #[derive(Deserialize)]
    struct TokenResponse {
        access_token: String,
    }

    #[derive(Deserialize)]
    struct UserInfo {
        email: String,
        #[serde(default)]
        name: Option<String>,
    }

    let client = reqwest::Client::new();
    let token: TokenResponse = client
        .post(GOOGLE_TOKEN_URL)
        .form(&[
            ("client_id", google.client_id.as_str()),
            ("client_secret", google.client_secret.as_str()),
            ("code", query.code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", google.redirect_uri.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let info: UserInfo = client
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(&token.access_token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    // First sign-in creates the account with no password hash; later ones
    // keep whatever name the user set themselves.
    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name) VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE
        SET name = CASE WHEN users.name = '' THEN EXCLUDED.name ELSE users.name END
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&info.email)
    .bind(info.name.unwrap_or_default())
    .fetch_one(&state.pool)
    .await?;

    let session_token = issue_token(&secret, user.id, &user.email)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_signin_google",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(format!(
        "{}/login?token={}",
        state.config.frontend_origin, session_token
    ))
}

pub fn issue_token(secret: &str, user_id: Uuid, email: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(7))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn account_state(user: User) -> AccountState {
    AccountState {
        email: user.email,
        cart: user.cart.0.normalize(),
        wishlist: user.wishlist.0.normalize(),
    }
}

fn api_secret() -> AppResult<String> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

fn session_secret() -> AppResult<String> {
    match std::env::var("SESSION_SECRET") {
        Ok(secret) => Ok(secret),
        Err(_) => api_secret(),
    }
}

fn url_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}
