//! Authentication and ownership checks for mutating requests.
//!
//! A request moves `Unauthenticated -> Authenticated -> (Authorized | Forbidden)`.
//! [`AuthorizationGuard::authenticate`] performs the first transition from the
//! raw `Authorization` header; the `authorize_*` methods perform the second for
//! each kind of mutation.

use std::sync::Arc;
use thiserror::Error;

use crate::db::Store;
use crate::domain::{BlogId, Principal, UserId};
use crate::services::token::{TokenError, TokenService};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token missing or invalid")]
    Unauthenticated,

    #[error("token expired")]
    Expired,

    #[error("only the creator can delete this resource")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Ownership lookup failed: {0}")]
    Lookup(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::Expired,
            TokenError::Invalid | TokenError::Signing(_) | TokenError::Config(_) => {
                Self::Unauthenticated
            }
        }
    }
}

/// Who may change the likes of a blog.
///
/// Likes are deliberately open to every caller, authenticated or not, while
/// deletion is restricted to the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikesPolicy {
    Open,
}

/// Persistence seam the guard needs: who owns a blog.
#[async_trait::async_trait]
pub trait OwnershipLookup: Send + Sync {
    async fn blog_owner(&self, id: BlogId) -> anyhow::Result<Option<UserId>>;
}

#[async_trait::async_trait]
impl OwnershipLookup for Store {
    async fn blog_owner(&self, id: BlogId) -> anyhow::Result<Option<UserId>> {
        self.get_blog_owner(id).await
    }
}

pub struct AuthorizationGuard {
    tokens: Arc<TokenService>,
    ownership: Arc<dyn OwnershipLookup>,
}

impl AuthorizationGuard {
    #[must_use]
    pub fn new(tokens: Arc<TokenService>, ownership: Arc<dyn OwnershipLookup>) -> Self {
        Self { tokens, ownership }
    }

    /// Resolves the principal from an `Authorization: Bearer <token>` header value.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthenticated`] for a missing or malformed header or an
    /// invalid token, [`AuthError::Expired`] for an expired one.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, AuthError> {
        let token = authorization
            .and_then(extract_bearer)
            .ok_or(AuthError::Unauthenticated)?;

        Ok(self.tokens.verify(token)?)
    }

    /// Any authenticated principal may create; the returned id becomes the owner.
    #[must_use]
    pub fn authorize_create(&self, principal: &Principal) -> UserId {
        principal.id
    }

    /// # Errors
    ///
    /// [`AuthError::NotFound`] when the blog does not exist,
    /// [`AuthError::Forbidden`] when it belongs to someone else.
    pub async fn authorize_delete(
        &self,
        principal: &Principal,
        blog_id: BlogId,
    ) -> Result<(), AuthError> {
        let owner = self
            .ownership
            .blog_owner(blog_id)
            .await
            .map_err(|e| AuthError::Lookup(e.to_string()))?
            .ok_or(AuthError::NotFound("blog"))?;

        if owner == principal.id {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %principal.id,
                blog_id = %blog_id,
                "Rejected delete of blog owned by another user"
            );
            Err(AuthError::Forbidden)
        }
    }

    #[must_use]
    pub const fn authorize_likes_update(&self) -> LikesPolicy {
        LikesPolicy::Open
    }

    /// A user may only delete their own account.
    pub fn authorize_user_delete(
        &self,
        principal: &Principal,
        user_id: UserId,
    ) -> Result<(), AuthError> {
        if principal.id == user_id {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// Returns the token of a `Bearer` header, scheme matched case-insensitively.
fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::token::TokenConfig;
    use std::collections::HashMap;
    use std::time::Duration;

    struct FakeOwnership(HashMap<BlogId, UserId>);

    #[async_trait::async_trait]
    impl OwnershipLookup for FakeOwnership {
        async fn blog_owner(&self, id: BlogId) -> anyhow::Result<Option<UserId>> {
            Ok(self.0.get(&id).copied())
        }
    }

    fn tokens() -> Arc<TokenService> {
        Arc::new(
            TokenService::new(&TokenConfig::new("sekret", Duration::from_secs(3600))).unwrap(),
        )
    }

    fn principal(name: &str) -> Principal {
        Principal {
            id: UserId::generate(),
            username: name.to_string(),
        }
    }

    fn guard_with(owned: &[(BlogId, UserId)]) -> AuthorizationGuard {
        AuthorizationGuard::new(
            tokens(),
            Arc::new(FakeOwnership(owned.iter().copied().collect())),
        )
    }

    #[test]
    fn test_authenticate_with_valid_bearer() {
        let tokens = tokens();
        let guard = AuthorizationGuard::new(tokens.clone(), Arc::new(FakeOwnership(HashMap::new())));
        let p = principal("root");
        let token = tokens.issue(&p).unwrap();

        let header = format!("Bearer {token}");
        assert_eq!(guard.authenticate(Some(&header)).unwrap(), p);

        let lowercase = format!("bearer {token}");
        assert_eq!(guard.authenticate(Some(&lowercase)).unwrap(), p);
    }

    #[test]
    fn test_authenticate_rejects_missing_or_malformed_header() {
        let guard = guard_with(&[]);

        assert!(matches!(guard.authenticate(None), Err(AuthError::Unauthenticated)));
        assert!(matches!(
            guard.authenticate(Some("Bearer")),
            Err(AuthError::Unauthenticated)
        ));
        assert!(matches!(
            guard.authenticate(Some("Basic cm9vdDpzZWtyZXQ=")),
            Err(AuthError::Unauthenticated)
        ));
        assert!(matches!(
            guard.authenticate(Some("Bearer nonsense")),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[test]
    fn test_authenticate_reports_expired_token() {
        let tokens = tokens();
        let guard = AuthorizationGuard::new(tokens.clone(), Arc::new(FakeOwnership(HashMap::new())));
        let token = tokens
            .issue_at(
                &principal("root"),
                chrono::Utc::now() - chrono::Duration::hours(2),
            )
            .unwrap();

        let header = format!("Bearer {token}");
        assert!(matches!(guard.authenticate(Some(&header)), Err(AuthError::Expired)));
    }

    #[tokio::test]
    async fn test_owner_may_delete() {
        let owner = principal("root");
        let blog = BlogId::generate();
        let guard = guard_with(&[(blog, owner.id)]);

        assert!(guard.authorize_delete(&owner, blog).await.is_ok());
    }

    #[tokio::test]
    async fn test_other_user_is_forbidden() {
        let owner = principal("root");
        let intruder = principal("mallory");
        let blog = BlogId::generate();
        let guard = guard_with(&[(blog, owner.id)]);

        assert!(matches!(
            guard.authorize_delete(&intruder, blog).await,
            Err(AuthError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_missing_blog_is_not_found() {
        let guard = guard_with(&[]);

        assert!(matches!(
            guard.authorize_delete(&principal("root"), BlogId::generate()).await,
            Err(AuthError::NotFound("blog"))
        ));
    }

    #[test]
    fn test_create_and_likes_policies() {
        let guard = guard_with(&[]);
        let p = principal("root");

        assert_eq!(guard.authorize_create(&p), p.id);
        assert_eq!(guard.authorize_likes_update(), LikesPolicy::Open);
    }

    #[test]
    fn test_user_delete_is_self_only() {
        let guard = guard_with(&[]);
        let p = principal("root");

        assert!(guard.authorize_user_delete(&p, p.id).is_ok());
        assert!(matches!(
            guard.authorize_user_delete(&p, UserId::generate()),
            Err(AuthError::Forbidden)
        ));
    }
}
