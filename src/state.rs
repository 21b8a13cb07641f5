use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthorizationGuard, BlogService, CredentialStore, OwnershipLookup, SeaOrmBlogService,
    SeaOrmUserService, TokenConfig, TokenService, UserService,
};

/// Long-lived services shared by the HTTP layer and the CLI commands.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: Arc<TokenService>,

    pub credentials: Arc<CredentialStore>,

    pub guard: Arc<AuthorizationGuard>,

    pub blog_service: Arc<dyn BlogService>,

    pub user_service: Arc<dyn UserService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Wires the services around an already-connected store.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let tokens = Arc::new(
            TokenService::new(&TokenConfig::from(&config.security))
                .map_err(|e| anyhow::anyhow!("Failed to configure token signing: {e}"))?,
        );
        let credentials = Arc::new(
            CredentialStore::new(&config.security)
                .map_err(|e| anyhow::anyhow!("Failed to configure password hashing: {e}"))?,
        );

        let ownership: Arc<dyn OwnershipLookup> = Arc::new(store.clone());
        let guard = Arc::new(AuthorizationGuard::new(tokens.clone(), ownership));

        let blog_service = Arc::new(SeaOrmBlogService::new(store.clone(), guard.clone()))
            as Arc<dyn BlogService + Send + Sync + 'static>;

        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            credentials.clone(),
            tokens.clone(),
            guard.clone(),
        )) as Arc<dyn UserService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens,
            credentials,
            guard,
            blog_service,
            user_service,
        })
    }
}
