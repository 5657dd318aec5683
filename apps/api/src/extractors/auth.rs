//! Request-scoped identity.
//!
//! Sessions are issued by the hosted auth provider as HS256 JWTs whose `sub`
//! is the user's UUID. Handlers take `AuthUser` as a parameter; every query
//! they run is scoped by `user_id`.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
}

/// Verification material for provider-issued access tokens.
#[derive(Clone)]
pub struct JwtKeys {
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtKeys {
    pub fn new(secret: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            tracing::debug!("Rejected access token: {e}");
            AppError::Unauthorized
        })?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
        })
    }
}

/// Shared secret presented by the external scheduler.
#[derive(Clone)]
pub struct CronSecret(pub Arc<str>);

/// Guard for scheduler-invoked endpoints. Carries no data.
#[derive(Debug)]
pub struct CronAuth;

#[async_trait]
impl<S> FromRequestParts<S> for CronAuth
where
    CronSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let CronSecret(expected) = CronSecret::from_ref(state);

        if expected.is_empty() || !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
            tracing::warn!("Scheduler request with invalid bearer token");
            return Err(AppError::Unauthorized);
        }
        Ok(CronAuth)
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get, Router};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use tower::ServiceExt;

    pub(crate) const TEST_SECRET: &str = "test-jwt-secret";

    pub(crate) fn sign_token(user_id: Uuid, audience: &str) -> String {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
        let claims = json!({
            "sub": user_id.to_string(),
            "aud": audience,
            "exp": exp,
            "email": "taster@example.com",
        });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    async fn whoami(user: AuthUser) -> String {
        user.user_id.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/me", get(whoami))
            .with_state(JwtKeys::new(TEST_SECRET, "authenticated"))
    }

    #[tokio::test]
    async fn test_valid_token_yields_user_id() {
        let user_id = Uuid::new_v4();
        let token = sign_token(user_id, "authenticated");
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(std::str::from_utf8(&body).unwrap(), user_id.to_string());
    }

    #[tokio::test]
    async fn test_missing_header_is_401() {
        let response = app()
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_audience_is_401() {
        let token = sign_token(Uuid::new_v4(), "anon");
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cron_guard_rejects_wrong_secret() {
        async fn tick(_: CronAuth) -> &'static str {
            "ok"
        }
        let app = Router::new()
            .route("/tick", get(tick))
            .with_state(CronSecret(Arc::from("s3cret")));

        let denied = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/tick")
                    .header("Authorization", "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

        let allowed = app
            .oneshot(
                Request::builder()
                    .uri("/tick")
                    .header("Authorization", "Bearer s3cret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
