//! Account identity carried in bearer tokens

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// JWT claims issued by the authentication provider.
/// `sub` is the owning account identifier every query is scoped to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountClaims {
    pub sub: Uuid,
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl AccountClaims {
    pub fn new(account_id: Uuid, email: Option<String>, valid_for: chrono::Duration) -> Self {
        let now = chrono::Utc::now();
        Self {
            sub: account_id,
            email,
            exp: (now + valid_for).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn account_id(&self) -> Uuid {
        self.sub
    }

    /// Create a signed token (used by tooling and tests; production tokens come from the provider)
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Fail with an authorization error unless `owner` is this account
    pub fn require_owner(&self, owner: Uuid) -> Result<(), AppError> {
        if owner == self.sub {
            Ok(())
        } else {
            Err(AppError::Authorization("Not authorized".to_string()))
        }
    }
}
