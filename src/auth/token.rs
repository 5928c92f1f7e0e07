//! Signed, time-limited bearer tokens.
//!
//! Tokens are HS256 JWTs over `{sub, iat, exp}`. The signing secret is
//! loaded once from configuration and injected at construction; rotating
//! it invalidates every outstanding token, which is an accepted limitation.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default token lifetime: 1 hour.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Missing bearer token")]
    Missing,

    #[error("Malformed or invalid token")]
    Malformed,

    #[error("Token expired")]
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID, as a decimal string.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Parses the subject back into a user ID.
    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub.parse().map_err(|_| TokenError::Malformed)
    }
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        }
    }

    /// Signs a claim set for `user_id`, expiring `ttl_seconds` from now.
    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_seconds,
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| TokenError::Malformed)
    }

    /// Verifies signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify_and_carry_the_user_id() {
        let service = TokenService::new("test-secret", DEFAULT_TOKEN_TTL_SECONDS);
        let token = service.issue(12345).unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 12345);
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECONDS);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        // Negative TTL simulates a token issued more than an hour ago.
        let service = TokenService::new("test-secret", -60);
        let token = service.issue(1).unwrap();
        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn tokens_signed_with_another_secret_are_malformed() {
        let issuer = TokenService::new("secret-a", DEFAULT_TOKEN_TTL_SECONDS);
        let verifier = TokenService::new("secret-b", DEFAULT_TOKEN_TTL_SECONDS);
        let token = issuer.issue(1).unwrap();
        assert_eq!(verifier.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn garbage_is_malformed() {
        let service = TokenService::new("test-secret", DEFAULT_TOKEN_TTL_SECONDS);
        assert_eq!(
            service.verify("not.a.token"),
            Err(TokenError::Malformed)
        );
    }
}
