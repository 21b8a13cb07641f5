//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the principal's username and id. They are
//! stateless: verification checks the signature and the expiry, nothing is
//! persisted and nothing can be revoked.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::domain::{Principal, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token missing or invalid")]
    Invalid,

    #[error("token expired")]
    Expired,

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Invalid token configuration: {0}")]
    Config(String),
}

/// Secret and lifetime injected at construction.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl: Duration,
}

impl TokenConfig {
    #[must_use]
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }
}

impl From<&SecurityConfig> for TokenConfig {
    fn from(config: &SecurityConfig) -> Self {
        Self::new(
            config.token_secret.clone(),
            Duration::from_secs(config.token_ttl_seconds),
        )
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    username: String,
    id: UserId,
    iat: i64,
    exp: i64,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl TokenService {
    /// # Errors
    ///
    /// Returns [`TokenError::Config`] if the TTL cannot be represented as a
    /// date offset.
    pub fn new(config: &TokenConfig) -> Result<Self, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        let ttl = chrono::Duration::from_std(config.ttl)
            .map_err(|e| TokenError::Config(format!("TTL {:?} out of range: {e}", config.ttl)))?;

        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl,
        })
    }

    /// Signs a token for `principal` that expires one TTL from now.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        self.issue_at(principal, Utc::now())
    }

    /// Signs a token as if it had been issued at `issued_at`.
    pub fn issue_at(
        &self,
        principal: &Principal,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("expiry out of range".to_string()))?;

        let claims = Claims {
            username: principal.username.clone(),
            id: principal.id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// # Errors
    ///
    /// [`TokenError::Expired`] once past expiry, [`TokenError::Invalid`] for
    /// anything else that fails to decode or verify.
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Invalid);
        }

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;

        Ok(Principal {
            id: data.claims.id,
            username: data.claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&TokenConfig::new(secret, Duration::from_secs(3600))).unwrap()
    }

    fn principal() -> Principal {
        Principal {
            id: UserId::generate(),
            username: "root".to_string(),
        }
    }

    #[test]
    fn test_issue_then_verify_returns_principal() {
        let tokens = service("sekret");
        let p = principal();

        let token = tokens.issue(&p).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), p);
    }

    #[test]
    fn test_token_aged_past_ttl_is_expired() {
        let tokens = service("sekret");
        let issued_at = Utc::now() - chrono::Duration::minutes(61);

        let token = tokens.issue_at(&principal(), issued_at).unwrap();
        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_token_within_ttl_is_accepted() {
        let tokens = service("sekret");
        let issued_at = Utc::now() - chrono::Duration::minutes(59);

        let token = tokens.issue_at(&principal(), issued_at).unwrap();
        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_invalid() {
        let token = service("rotated").issue(&principal()).unwrap();
        assert_eq!(service("sekret").verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_garbage_and_empty_tokens_are_invalid() {
        let tokens = service("sekret");
        assert_eq!(tokens.verify(""), Err(TokenError::Invalid));
        assert_eq!(tokens.verify("not.a.jwt"), Err(TokenError::Invalid));
    }

    #[test]
    fn test_unrepresentable_ttl_is_rejected() {
        let config = TokenConfig::new("sekret", Duration::from_secs(u64::MAX));
        assert!(matches!(TokenService::new(&config), Err(TokenError::Config(_))));
    }

    #[test]
    fn test_expiry_overflow_is_an_error() {
        let tokens = service("sekret");
        let result = tokens.issue_at(&principal(), DateTime::<Utc>::MAX_UTC);
        assert!(matches!(result, Err(TokenError::Signing(_))));
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let tokens = service("sekret");
        let token = tokens.issue(&principal()).unwrap();

        let other = tokens
            .issue(&Principal {
                id: UserId::generate(),
                username: "mallory".to_string(),
            })
            .unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = other.split('.').nth(1).unwrap();

        assert_eq!(tokens.verify(&parts.join(".")), Err(TokenError::Invalid));
    }
}
