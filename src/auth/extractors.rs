use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::auth::handlers::bearer_token;
use crate::auth::jwt::{Claims, JwtKeys};
use crate::error::ApiError;

/// Extracts and validates the bearer token, exposing the verified
/// claims to protected downstream handlers.
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Auth("No token provided".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys
            .verify(token)
            .map_err(|_| ApiError::Auth("Invalid or expired token".into()))?;

        Ok(AuthUser(claims))
    }
}
