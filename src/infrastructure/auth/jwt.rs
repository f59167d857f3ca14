//! JWT Identity Provider
//!
//! Resolves the bearer credential carried on the connection handshake.
//! Tokens are issued by the login surface (out of scope here) with the
//! username as subject plus `userId` and `role` claims.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

use crate::domain::{Identity, IdentityProvider};
use crate::shared::error::AppError;

/// JWT claims carried by chat credentials.
#[derive(Debug, Deserialize)]
struct Claims {
    /// Username
    sub: String,
    /// Opaque user identifier
    #[serde(rename = "userId")]
    user_id: String,
    /// Role name (USER, MODERATOR, ADMIN)
    role: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Identity provider backed by HMAC-signed JWTs.
pub struct JwtIdentityProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

impl IdentityProvider for JwtIdentityProvider {
    fn resolve(&self, token: &str) -> Result<Identity, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {e}")))?;

        Ok(Identity {
            user_id: data.claims.user_id,
            username: data.claims.sub,
            role: data.claims.role,
        })
    }
}
