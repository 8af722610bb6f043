//! API handlers for BrewVault REST endpoints

pub mod alerts;
pub mod beans;
pub mod brews;
pub mod cron;
pub mod cupping;
pub mod equipment;
pub mod health;
pub mod openapi;
pub mod stats;
pub mod water_recipes;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::{error::AppError, models::AccountClaims, AppState};

/// Extractor for the authenticated account from a JWT bearer token
pub struct AuthenticatedUser(pub AccountClaims);

/// Token from an `Authorization: Bearer <token>` header value
pub(crate) fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = bearer_token(auth_header)
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = AccountClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
    }
}
