//! Domain service for blog management.
//!
//! Creation and deletion pass through the [`AuthorizationGuard`](crate::services::guard::AuthorizationGuard);
//! likes updates are open to every caller.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Blog, MalformedId, NewBlog, Principal, User};
use crate::services::analytics::BlogStats;
use crate::services::guard::AuthError;

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("{0}")]
    Validation(String),

    #[error("malformatted id")]
    MalformedId,

    #[error("blog not found")]
    NotFound,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<MalformedId> for BlogError {
    fn from(_: MalformedId) -> Self {
        Self::MalformedId
    }
}

impl From<anyhow::Error> for BlogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Request body for blog creation, checked by [`BlogInput::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

impl BlogInput {
    /// # Errors
    ///
    /// Returns [`BlogError::Validation`] naming every missing required field.
    pub fn validate(self) -> Result<NewBlog, BlogError> {
        let title = self.title.filter(|t| !t.trim().is_empty());
        let url = self.url.filter(|u| !u.trim().is_empty());

        match (title, url) {
            (Some(title), Some(url)) => Ok(NewBlog {
                title,
                author: self.author.filter(|a| !a.trim().is_empty()),
                url,
                likes: self.likes.unwrap_or(0),
            }),
            (title, url) => {
                let mut missing = Vec::new();
                if title.is_none() {
                    missing.push("title: Path `title` is required.");
                }
                if url.is_none() {
                    missing.push("url: Path `url` is required.");
                }
                Err(BlogError::Validation(format!(
                    "Blog validation failed: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// A blog together with the user who owns it.
#[derive(Debug, Clone)]
pub struct BlogWithOwner {
    pub blog: Blog,
    pub owner: Option<User>,
}

#[async_trait::async_trait]
pub trait BlogService: Send + Sync {
    async fn list_blogs(&self) -> Result<Vec<BlogWithOwner>, BlogError>;

    /// # Errors
    ///
    /// [`BlogError::MalformedId`] if `id` is not a valid identifier.
    async fn get_blog(&self, id: &str) -> Result<BlogWithOwner, BlogError>;

    /// Creates a blog owned by `principal`.
    async fn create_blog(
        &self,
        principal: &Principal,
        input: BlogInput,
    ) -> Result<BlogWithOwner, BlogError>;

    /// Deletes a blog; only its owner may do so.
    async fn delete_blog(&self, principal: &Principal, id: &str) -> Result<(), BlogError>;

    /// Sets the like count. No authentication involved.
    async fn update_likes(&self, id: &str, likes: Option<i64>) -> Result<Blog, BlogError>;

    /// Aggregate statistics over every stored blog.
    async fn stats(&self) -> Result<BlogStats, BlogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_likes_default_to_zero() {
        let blog = BlogInput {
            title: Some("Title".to_string()),
            url: Some("https://example.com".to_string()),
            ..BlogInput::default()
        }
        .validate()
        .unwrap();

        assert_eq!(blog.likes, 0);
        assert_eq!(blog.author, None);
    }

    #[test]
    fn test_missing_title_is_reported() {
        let err = BlogInput {
            url: Some("https://example.com".to_string()),
            ..BlogInput::default()
        }
        .validate()
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Blog validation failed: title: Path `title` is required."
        );
    }

    #[test]
    fn test_blank_fields_count_as_missing() {
        let err = BlogInput {
            title: Some("  ".to_string()),
            url: Some(String::new()),
            ..BlogInput::default()
        }
        .validate()
        .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Path `title` is required"));
        assert!(msg.contains("Path `url` is required"));
    }
}
