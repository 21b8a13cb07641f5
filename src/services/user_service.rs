//! Domain service for user registration, listing and login.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::validation::USERNAME_MIN_LENGTH;
use crate::domain::{Blog, MalformedId, Principal, User};
use crate::services::credentials::CredentialError;
use crate::services::guard::AuthError;
use crate::services::token::TokenError;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),

    #[error("malformatted id")]
    MalformedId,

    #[error("user not found")]
    NotFound,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<MalformedId> for UserError {
    fn from(_: MalformedId) -> Self {
        Self::MalformedId
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<CredentialError> for UserError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Validation(msg) => Self::Validation(msg),
            CredentialError::Hashing(msg) => Self::Internal(msg),
        }
    }
}

impl From<TokenError> for UserError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Request body for registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    pub username: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Checks presence and minimum length of a username.
///
/// # Errors
///
/// Returns [`UserError::Validation`] with a message naming the violated constraint.
pub fn validate_username(username: Option<&str>) -> Result<&str, UserError> {
    let Some(username) = username.filter(|u| !u.is_empty()) else {
        return Err(UserError::Validation(
            "User validation failed: username: Path `username` is required.".to_string(),
        ));
    };

    if username.chars().count() < USERNAME_MIN_LENGTH {
        return Err(UserError::Validation(format!(
            "User validation failed: username: Path `username` (`{username}`) is shorter than the minimum allowed length ({USERNAME_MIN_LENGTH})."
        )));
    }

    Ok(username)
}

#[must_use]
pub fn username_taken_message(username: &str) -> String {
    format!(
        "User validation failed: username: Error, expected `username` to be unique. Value: `{username}`"
    )
}

/// A user with the blogs they own, in creation order.
#[derive(Debug, Clone)]
pub struct UserWithBlogs {
    pub user: User,
    pub blogs: Vec<Blog>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub username: String,
    pub name: Option<String>,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Validation`] for a missing/short password or
    /// username, or a username that is already taken.
    async fn register(&self, input: UserInput) -> Result<User, UserError>;

    async fn list_users(&self) -> Result<Vec<UserWithBlogs>, UserError>;

    /// Verifies credentials and issues a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::InvalidCredentials`] if the user is unknown or the
    /// password does not match.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, UserError>;

    /// Deletes the principal's own account together with their blogs.
    async fn delete_user(&self, principal: &Principal, id: &str) -> Result<(), UserError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username(Some("root")).is_ok());
        assert!(validate_username(Some("abc")).is_ok());

        let err = validate_username(Some("ro")).unwrap_err().to_string();
        assert!(err.contains("Path `username`"));
        assert!(err.contains("is shorter than the minimum allowed length"));

        let err = validate_username(None).unwrap_err().to_string();
        assert!(err.contains("Path `username` is required"));
        assert!(validate_username(Some("")).is_err());
    }

    #[test]
    fn test_unique_message() {
        assert!(username_taken_message("root").contains("expected `username` to be unique"));
    }
}
