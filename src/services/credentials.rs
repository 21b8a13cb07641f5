//! Password hashing and verification.
//!
//! Argon2id with parameters fixed at construction. Hashing and verification
//! are CPU-bound, so the async entry points move the work onto the blocking
//! pool.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;
use tokio::task;

use crate::config::SecurityConfig;
use crate::constants::validation::PASSWORD_MIN_LENGTH;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to hash password: {0}")]
    Hashing(String),
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    params: Params,
}

impl CredentialStore {
    /// # Errors
    ///
    /// Returns [`CredentialError::Hashing`] if the configured Argon2 parameters are invalid.
    pub fn new(config: &SecurityConfig) -> Result<Self, CredentialError> {
        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| CredentialError::Hashing(format!("Invalid Argon2 params: {e}")))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext password after enforcing the length policy.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Validation`] if the password is absent or not
    /// longer than the minimum length.
    pub fn hash(&self, password: Option<&str>) -> Result<String, CredentialError> {
        let password = validate_password(password)?;
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Returns false on mismatch and on an unparseable hash.
    #[must_use]
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(password_hash) else {
            tracing::warn!("Stored password hash could not be parsed");
            return false;
        };

        // Parameters are read from the PHC string, so hashes made with other
        // cost settings still verify.
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    pub async fn hash_blocking(&self, password: Option<&str>) -> Result<String, CredentialError> {
        // Validate before paying for a blocking task.
        let password = validate_password(password)?.to_string();
        let store = self.clone();

        task::spawn_blocking(move || store.hash(Some(&password)))
            .await
            .map_err(|e| CredentialError::Hashing(format!("Hashing task panicked: {e}")))?
    }

    pub async fn verify_blocking(&self, password: &str, password_hash: &str) -> bool {
        let store = self.clone();
        let password = password.to_string();
        let password_hash = password_hash.to_string();

        match task::spawn_blocking(move || store.verify(&password, &password_hash)).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!("Password verification task panicked: {e}");
                false
            }
        }
    }
}

/// Enforces presence and the exclusive minimum length.
///
/// # Errors
///
/// Returns [`CredentialError::Validation`] with a message naming the violated constraint.
pub fn validate_password(password: Option<&str>) -> Result<&str, CredentialError> {
    let Some(password) = password else {
        return Err(CredentialError::Validation(
            "User validation failed: password: Path `password` is required.".to_string(),
        ));
    };

    if password.chars().count() <= PASSWORD_MIN_LENGTH {
        return Err(CredentialError::Validation(format!(
            "User validation failed: password: Path `password` is shorter than the minimum allowed length ({PASSWORD_MIN_LENGTH})."
        )));
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        // Cheap parameters keep the tests fast.
        let config = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        CredentialStore::new(&config).unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let store = store();
        let hash = store.hash(Some("sekret")).unwrap();

        assert!(store.verify("sekret", &hash));
        assert!(!store.verify("sekreT", &hash));
        assert!(!store.verify("", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let store = store();
        let a = store.hash(Some("sekret")).unwrap();
        let b = store.hash(Some("sekret")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_missing_password_is_rejected() {
        let err = store().hash(None).unwrap_err();
        assert!(matches!(err, CredentialError::Validation(ref msg) if msg.contains("is required")));
    }

    #[test]
    fn test_length_bound_is_exclusive() {
        let store = store();

        let err = store.hash(Some("abc")).unwrap_err();
        assert!(
            err.to_string()
                .contains("shorter than the minimum allowed length (3)")
        );

        assert!(store.hash(Some("abcd")).is_ok());
    }

    #[test]
    fn test_verify_with_garbage_hash_is_false() {
        assert!(!store().verify("sekret", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let store = store();
        let hash = store.hash_blocking(Some("salainen")).await.unwrap();
        assert!(store.verify_blocking("salainen", &hash).await);
        assert!(!store.verify_blocking("wrong", &hash).await);
    }
}
