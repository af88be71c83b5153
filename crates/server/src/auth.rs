//! Cookie-carried token authentication.
//!
//! Tokens are HS256 JWTs embedding the caller's email with a one-hour
//! expiry, set into an HTTP-only cookie by `POST /jwt` and re-verified
//! on every protected request. There is no session store and no
//! revocation; a token is valid until it expires.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::server::AppState;

/// Name of the cookie that carries the signed token.
pub const TOKEN_COOKIE: &str = "token";

/// Tokens expire one hour after issuance.
const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Claims embedded in an issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The identity the bearer claims to be.
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign a token asserting `email`, expiring in one hour.
pub fn issue_token(secret: &str, email: &str) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        email: email.to_string(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify signature and expiry, returning the embedded claims.
pub fn verify_token(secret: &str, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Identity decoded from the request's token cookie.
///
/// Extracting this from a request is the protected-route gate: a
/// missing, malformed, or expired cookie rejects with 401 before the
/// handler runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl CurrentUser {
    /// Owner check for per-user endpoints: the requested email must be
    /// the one embedded in the token.
    pub fn owns(&self, email: &str) -> bool {
        self.0.email == email
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "message": "Unauthorized access" })),
    )
        .into_response()
}

/// Rejection for an owner-check failure.
pub fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(serde_json::json!({ "message": "Forbidden access" })),
    )
        .into_response()
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(TOKEN_COOKIE).ok_or_else(unauthorized)?;
        let claims = verify_token(&state.cfg.token_secret, token.value())
            .map_err(|_| unauthorized())?;
        Ok(CurrentUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_issue_verify_round_trip() {
        let token = issue_token(SECRET, "a@x.com").unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            email: "a@x.com".to_string(),
            iat: now - 2 * TOKEN_TTL_SECS,
            exp: now - TOKEN_TTL_SECS,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = verify_token(SECRET, &token).unwrap_err();
        assert_eq!(
            err.kind(),
            &jsonwebtoken::errors::ErrorKind::ExpiredSignature
        );
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let token = issue_token(SECRET, "a@x.com").unwrap();
        let mut tampered = token.into_bytes();
        let last = tampered.last_mut().unwrap();
        *last = if *last == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(verify_token(SECRET, &tampered).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token(SECRET, "a@x.com").unwrap();
        assert!(verify_token("other-secret", &token).is_err());
    }

    #[test]
    fn test_owner_check() {
        let token = issue_token(SECRET, "a@x.com").unwrap();
        let user = CurrentUser(verify_token(SECRET, &token).unwrap());
        assert!(user.owns("a@x.com"));
        assert!(!user.owns("b@x.com"));
    }
}
