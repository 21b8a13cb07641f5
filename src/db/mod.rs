use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{Blog, BlogId, NewBlog, User, UserId};

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn blog_repo(&self) -> repositories::blog::BlogRepository {
        repositories::blog::BlogRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn create_user(
        &self,
        username: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<Option<User>> {
        self.user_repo().create(username, name, password_hash).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_with_password(&self, username: &str) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_username_with_password(username).await
    }

    pub async fn get_users_by_ids(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    // ========================================================================
    // Blogs
    // ========================================================================

    pub async fn create_blog(&self, blog: &NewBlog, owner: UserId) -> Result<Blog> {
        self.blog_repo().create(blog, owner).await
    }

    pub async fn get_blog(&self, id: BlogId) -> Result<Option<Blog>> {
        self.blog_repo().get(id).await
    }

    pub async fn get_blog_owner(&self, id: BlogId) -> Result<Option<UserId>> {
        self.blog_repo().owner_of(id).await
    }

    pub async fn list_blogs(&self) -> Result<Vec<Blog>> {
        self.blog_repo().list_all().await
    }

    pub async fn list_blogs_for_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, Vec<Blog>>> {
        self.blog_repo().list_for_users(user_ids).await
    }

    pub async fn update_blog_likes(&self, id: BlogId, likes: i64) -> Result<Option<Blog>> {
        self.blog_repo().update_likes(id, likes).await
    }

    pub async fn delete_blog(&self, id: BlogId) -> Result<bool> {
        self.blog_repo().delete(id).await
    }
}
