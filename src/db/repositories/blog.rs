use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::collections::HashMap;
use tracing::info;

use crate::domain::{Blog, BlogId, NewBlog, UserId};
use crate::entities::{blogs, prelude::*};

impl From<blogs::Model> for Blog {
    fn from(model: blogs::Model) -> Self {
        Self {
            id: model.id.into(),
            title: model.title,
            author: model.author,
            url: model.url,
            likes: model.likes,
            user_id: model.user_id.into(),
            created_at: model.created_at,
        }
    }
}

/// Repository for blog operations
pub struct BlogRepository {
    conn: DatabaseConnection,
}

impl BlogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, blog: &NewBlog, owner: UserId) -> Result<Blog> {
        let active = blogs::ActiveModel {
            id: Set(BlogId::generate().value()),
            title: Set(blog.title.clone()),
            author: Set(blog.author.clone()),
            url: Set(blog.url.clone()),
            likes: Set(blog.likes),
            user_id: Set(owner.value()),
            created_at: Set(super::timestamp()),
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert blog")?;

        info!(blog_id = %model.id, user_id = %owner, "Created blog");
        Ok(Blog::from(model))
    }

    pub async fn get(&self, id: BlogId) -> Result<Option<Blog>> {
        let blog = Blogs::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query blog")?;

        Ok(blog.map(Blog::from))
    }

    /// Only the owner column; enough for authorization checks.
    pub async fn owner_of(&self, id: BlogId) -> Result<Option<UserId>> {
        let owner: Option<uuid::Uuid> = Blogs::find_by_id(id.value())
            .select_only()
            .column(blogs::Column::UserId)
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to query blog owner")?;

        Ok(owner.map(UserId::from))
    }

    pub async fn list_all(&self) -> Result<Vec<Blog>> {
        let rows = Blogs::find()
            .order_by_asc(blogs::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list blogs")?;

        Ok(rows.into_iter().map(Blog::from).collect())
    }

    /// Blogs grouped by owner, each group in creation order.
    pub async fn list_for_users(&self, user_ids: &[UserId]) -> Result<HashMap<UserId, Vec<Blog>>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Blogs::find()
            .filter(blogs::Column::UserId.is_in(user_ids.iter().map(UserId::value)))
            .order_by_asc(blogs::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list blogs for users")?;

        let mut grouped: HashMap<UserId, Vec<Blog>> = HashMap::new();
        for row in rows {
            let blog = Blog::from(row);
            grouped.entry(blog.user_id).or_default().push(blog);
        }

        Ok(grouped)
    }

    pub async fn update_likes(&self, id: BlogId, likes: i64) -> Result<Option<Blog>> {
        let Some(model) = Blogs::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query blog for update")?
        else {
            return Ok(None);
        };

        let mut active: blogs::ActiveModel = model.into();
        active.likes = Set(likes);
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update blog likes")?;

        Ok(Some(Blog::from(updated)))
    }

    pub async fn delete(&self, id: BlogId) -> Result<bool> {
        let result = Blogs::delete_by_id(id.value())
            .exec(&self.conn)
            .await
            .context("Failed to delete blog")?;

        if result.rows_affected > 0 {
            info!(blog_id = %id, "Deleted blog");
        }

        Ok(result.rows_affected > 0)
    }
}
