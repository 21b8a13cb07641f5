//! `SeaORM` implementation of the `BlogService` trait.

use async_trait::async_trait;
use std::sync::Arc;

use crate::db::Store;
use crate::domain::{Blog, BlogId, Principal, UserId};
use crate::services::analytics::{self, BlogStats};
use crate::services::blog_service::{BlogError, BlogInput, BlogService, BlogWithOwner};
use crate::services::guard::{AuthorizationGuard, LikesPolicy};

pub struct SeaOrmBlogService {
    store: Store,
    guard: Arc<AuthorizationGuard>,
}

impl SeaOrmBlogService {
    #[must_use]
    pub const fn new(store: Store, guard: Arc<AuthorizationGuard>) -> Self {
        Self { store, guard }
    }

    async fn with_owner(&self, blog: Blog) -> Result<BlogWithOwner, BlogError> {
        let owner = self.store.get_user(blog.user_id).await?;
        Ok(BlogWithOwner { blog, owner })
    }
}

#[async_trait]
impl BlogService for SeaOrmBlogService {
    async fn list_blogs(&self) -> Result<Vec<BlogWithOwner>, BlogError> {
        let blogs = self.store.list_blogs().await?;

        let mut owner_ids: Vec<UserId> = blogs.iter().map(|b| b.user_id).collect();
        owner_ids.sort_unstable_by_key(|id| id.value());
        owner_ids.dedup();

        let owners = self.store.get_users_by_ids(&owner_ids).await?;

        Ok(blogs
            .into_iter()
            .map(|blog| {
                let owner = owners.get(&blog.user_id).cloned();
                BlogWithOwner { blog, owner }
            })
            .collect())
    }

    async fn get_blog(&self, id: &str) -> Result<BlogWithOwner, BlogError> {
        let id: BlogId = id.parse()?;

        let blog = self.store.get_blog(id).await?.ok_or(BlogError::NotFound)?;
        self.with_owner(blog).await
    }

    async fn create_blog(
        &self,
        principal: &Principal,
        input: BlogInput,
    ) -> Result<BlogWithOwner, BlogError> {
        let new_blog = input.validate()?;
        let owner = self.guard.authorize_create(principal);

        let blog = self.store.create_blog(&new_blog, owner).await?;
        self.with_owner(blog).await
    }

    async fn delete_blog(&self, principal: &Principal, id: &str) -> Result<(), BlogError> {
        let id: BlogId = id.parse()?;

        self.guard.authorize_delete(principal, id).await?;

        if !self.store.delete_blog(id).await? {
            // Removed concurrently between the ownership check and the delete.
            return Err(BlogError::NotFound);
        }

        Ok(())
    }

    async fn update_likes(&self, id: &str, likes: Option<i64>) -> Result<Blog, BlogError> {
        let id: BlogId = id.parse()?;

        let LikesPolicy::Open = self.guard.authorize_likes_update();

        let likes = likes.ok_or_else(|| {
            BlogError::Validation("Blog validation failed: likes: Path `likes` is required.".to_string())
        })?;

        self.store
            .update_blog_likes(id, likes)
            .await?
            .ok_or(BlogError::NotFound)
    }

    async fn stats(&self) -> Result<BlogStats, BlogError> {
        let blogs = self.store.list_blogs().await?;
        Ok(analytics::summarize(&blogs))
    }
}
