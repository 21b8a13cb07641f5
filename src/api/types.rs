use serde::{Deserialize, Serialize};

use crate::domain::{Blog, BlogId, User, UserId};
use crate::services::{BlogWithOwner, UserWithBlogs};

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Owner summary embedded in a blog.
#[derive(Debug, Serialize)]
pub struct BlogOwnerDto {
    pub id: UserId,
    pub username: String,
    pub name: Option<String>,
}

impl From<User> for BlogOwnerDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BlogDto {
    pub id: BlogId,
    pub title: String,
    pub author: Option<String>,
    pub url: String,
    pub likes: i64,
    pub user: BlogUserRef,
}

/// The owner is either expanded or, when it could not be joined, just its id.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BlogUserRef {
    Expanded(BlogOwnerDto),
    Id(UserId),
}

impl From<BlogWithOwner> for BlogDto {
    fn from(value: BlogWithOwner) -> Self {
        let BlogWithOwner { blog, owner } = value;
        let user = owner.map_or(BlogUserRef::Id(blog.user_id), |o| {
            BlogUserRef::Expanded(o.into())
        });

        Self {
            id: blog.id,
            title: blog.title,
            author: blog.author,
            url: blog.url,
            likes: blog.likes,
            user,
        }
    }
}

impl From<Blog> for BlogDto {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id,
            user: BlogUserRef::Id(blog.user_id),
            title: blog.title,
            author: blog.author,
            url: blog.url,
            likes: blog.likes,
        }
    }
}

/// Blog reference embedded in a user listing.
#[derive(Debug, Serialize)]
pub struct BlogSummaryDto {
    pub id: BlogId,
    pub title: String,
    pub author: Option<String>,
    pub url: String,
}

impl From<Blog> for BlogSummaryDto {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            author: blog.author,
            url: blog.url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: UserId,
    pub username: String,
    pub name: Option<String>,
    pub blogs: Vec<BlogSummaryDto>,
}

impl From<UserWithBlogs> for UserDto {
    fn from(value: UserWithBlogs) -> Self {
        Self {
            id: value.user.id,
            username: value.user.username,
            name: value.user.name,
            blogs: value.blogs.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            blogs: Vec::new(),
        }
    }
}
