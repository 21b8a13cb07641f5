use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use tracing::info;

use crate::domain::{User, UserId};
use crate::entities::{blogs, prelude::*, users};

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id.into(),
            username: model.username,
            name: model.name,
            created_at: model.created_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts a user. Returns `None` when the username is already taken.
    pub async fn create(
        &self,
        username: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<Option<User>> {
        let active = users::ActiveModel {
            id: Set(UserId::generate().value()),
            username: Set(username.to_string()),
            name: Set(name.map(str::to_string)),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(super::timestamp()),
        };

        match active.insert(&self.conn).await {
            Ok(model) => {
                info!(username = %model.username, "Created user");
                Ok(Some(User::from(model)))
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(None)
            }
            Err(err) => Err(err).context("Failed to insert user"),
        }
    }

    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = Users::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Get user by username together with the stored password hash (for login)
    pub async fn get_by_username_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn get_by_ids(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Users::find()
            .filter(users::Column::Id.is_in(ids.iter().map(UserId::value)))
            .all(&self.conn)
            .await
            .context("Failed to query users by IDs")?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let user = User::from(row);
                (user.id, user)
            })
            .collect())
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Removes the user and every blog they own in one transaction.
    pub async fn delete(&self, id: UserId) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let removed_blogs = Blogs::delete_many()
            .filter(blogs::Column::UserId.eq(id.value()))
            .exec(&txn)
            .await
            .context("Failed to delete blogs of user")?
            .rows_affected;

        let result = Users::delete_by_id(id.value())
            .exec(&txn)
            .await
            .context("Failed to delete user")?;

        txn.commit().await?;

        if result.rows_affected > 0 {
            info!(user_id = %id, removed_blogs, "Deleted user");
        }

        Ok(result.rows_affected > 0)
    }
}
