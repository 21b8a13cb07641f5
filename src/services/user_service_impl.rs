//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::db::Store;
use crate::domain::{Principal, User, UserId};
use crate::services::credentials::{CredentialStore, validate_password};
use crate::services::guard::AuthorizationGuard;
use crate::services::token::TokenService;
use crate::services::user_service::{
    LoginResult, UserError, UserInput, UserService, UserWithBlogs, username_taken_message,
    validate_username,
};

pub struct SeaOrmUserService {
    store: Store,
    credentials: Arc<CredentialStore>,
    tokens: Arc<TokenService>,
    guard: Arc<AuthorizationGuard>,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(
        store: Store,
        credentials: Arc<CredentialStore>,
        tokens: Arc<TokenService>,
        guard: Arc<AuthorizationGuard>,
    ) -> Self {
        Self {
            store,
            credentials,
            tokens,
            guard,
        }
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn register(&self, input: UserInput) -> Result<User, UserError> {
        // Password policy is checked first, then the username rules.
        validate_password(input.password.as_deref())?;
        let username = validate_username(input.username.as_deref())?.to_string();

        if self.store.get_user_by_username(&username).await?.is_some() {
            return Err(UserError::Validation(username_taken_message(&username)));
        }

        let password_hash = self
            .credentials
            .hash_blocking(input.password.as_deref())
            .await?;

        // The unique index still guards a concurrent registration of the same name.
        self.store
            .create_user(&username, input.name.as_deref(), &password_hash)
            .await?
            .ok_or_else(|| UserError::Validation(username_taken_message(&username)))
    }

    async fn list_users(&self) -> Result<Vec<UserWithBlogs>, UserError> {
        let users = self.store.list_users().await?;
        let ids: Vec<UserId> = users.iter().map(|u| u.id).collect();

        let mut blogs_by_user = self.store.list_blogs_for_users(&ids).await?;

        Ok(users
            .into_iter()
            .map(|user| {
                let blogs = blogs_by_user.remove(&user.id).unwrap_or_default();
                UserWithBlogs { user, blogs }
            })
            .collect())
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, UserError> {
        let Some((user, password_hash)) = self.store.get_user_with_password(username).await?
        else {
            info!(username, "Login attempt for unknown user");
            return Err(UserError::InvalidCredentials);
        };

        if !self
            .credentials
            .verify_blocking(password, &password_hash)
            .await
        {
            info!(username, "Login attempt with wrong password");
            return Err(UserError::InvalidCredentials);
        }

        let token = self.tokens.issue(&Principal::from(&user))?;

        Ok(LoginResult {
            token,
            username: user.username,
            name: user.name,
        })
    }

    async fn delete_user(&self, principal: &Principal, id: &str) -> Result<(), UserError> {
        let id: UserId = id.parse()?;

        // Ownership first, so other accounts' ids stay indistinguishable.
        self.guard.authorize_user_delete(principal, id)?;

        if !self.store.delete_user(id).await? {
            return Err(UserError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::services::guard::{AuthError, OwnershipLookup};
    use crate::services::token::TokenConfig;
    use std::time::Duration;

    async fn service() -> SeaOrmUserService {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("in-memory store");

        let security = SecurityConfig {
            argon2_memory_cost_kib: 8,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        let credentials = Arc::new(CredentialStore::new(&security).unwrap());
        let tokens = Arc::new(
            TokenService::new(&TokenConfig::new("sekret", Duration::from_secs(3600))).unwrap(),
        );
        let ownership: Arc<dyn OwnershipLookup> = Arc::new(store.clone());
        let guard = Arc::new(AuthorizationGuard::new(tokens.clone(), ownership));

        SeaOrmUserService::new(store, credentials, tokens, guard)
    }

    async fn register(service: &SeaOrmUserService, username: &str) -> User {
        service
            .register(UserInput {
                username: Some(username.to_string()),
                name: None,
                password: Some("sekret".to_string()),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_delete_of_unknown_id_is_forbidden_not_missing() {
        let service = service().await;
        let user = register(&service, "root").await;
        let principal = Principal::from(&user);

        let result = service
            .delete_user(&principal, &UserId::generate().to_string())
            .await;
        assert!(matches!(result, Err(UserError::Auth(AuthError::Forbidden))));
    }

    #[tokio::test]
    async fn test_delete_own_account_twice() {
        let service = service().await;
        let user = register(&service, "root").await;
        let principal = Principal::from(&user);

        service
            .delete_user(&principal, &user.id.to_string())
            .await
            .unwrap();

        let again = service.delete_user(&principal, &user.id.to_string()).await;
        assert!(matches!(again, Err(UserError::NotFound)));
    }
}
