use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::AppError;

/// Header slot carrying the bearer token on protected routes.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Identity bound to the request after the token checked out.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .filter(|v| !v.as_bytes().iter().all(u8::is_ascii_whitespace))
            .ok_or_else(|| AppError::unauthenticated("No Token, authorization denied"))?;

        // a token was sent, even if it is not readable text
        let token = raw.to_str().map(str::trim).map_err(|e| {
            warn!(reason = %e, "token header is not visible ascii");
            AppError::unauthenticated("Token is not valid")
        })?;

        let keys = JwtKeys::from_ref(state);
        // the reason stays in the logs, callers only learn the token is bad
        let claims = keys.verify(token).map_err(|e| {
            warn!(reason = %e, "token rejected");
            AppError::unauthenticated("Token is not valid")
        })?;

        Ok(AuthUser(claims.sub))
    }
}
