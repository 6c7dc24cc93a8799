use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError};

/// Identity resolved from a bearer credential.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Resolve a bearer token: session-issued format first, then the custom
/// API-issued format. Unverifiable by both means unauthorized.
pub fn resolve_bearer(
    token: &str,
    session_secret: &str,
    api_secret: &str,
) -> Result<AuthUser, AppError> {
    let try_decode = |secret: &str| {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .ok()
    };

    let claims = try_decode(session_secret)
        .or_else(|| try_decode(api_secret))
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?
        .claims;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid token".into()))?;

    Ok(AuthUser {
        user_id,
        email: claims.email,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let api_secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;
        // Session tokens share the API secret when no dedicated one is set.
        let session_secret =
            std::env::var("SESSION_SECRET").unwrap_or_else(|_| api_secret.clone());

        resolve_bearer(token, &session_secret, &api_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token_for(secret: &str, sub: &str, ttl_hours: i64) -> String {
        let exp = Utc::now()
            .checked_add_signed(Duration::hours(ttl_hours))
            .unwrap()
            .timestamp() as usize;
        let claims = Claims {
            sub: sub.to_string(),
            email: "maker@example.com".to_string(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn session_format_resolves_first() {
        let id = Uuid::new_v4();
        let token = token_for("session-secret", &id.to_string(), 1);
        let user = resolve_bearer(&token, "session-secret", "api-secret").unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.email, "maker@example.com");
    }

    #[test]
    fn custom_format_resolves_as_fallback() {
        let id = Uuid::new_v4();
        let token = token_for("api-secret", &id.to_string(), 1);
        let user = resolve_bearer(&token, "session-secret", "api-secret").unwrap();
        assert_eq!(user.user_id, id);
    }

    #[test]
    fn unverifiable_by_both_is_unauthorized() {
        let token = token_for("some-other-secret", &Uuid::new_v4().to_string(), 1);
        let err = resolve_bearer(&token, "session-secret", "api-secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = resolve_bearer("not-a-jwt", "session-secret", "api-secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let token = token_for("api-secret", &Uuid::new_v4().to_string(), -1);
        let err = resolve_bearer(&token, "session-secret", "api-secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn non_uuid_subject_is_unauthorized() {
        let token = token_for("api-secret", "not-a-uuid", 1);
        let err = resolve_bearer(&token, "session-secret", "api-secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
