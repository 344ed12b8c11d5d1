use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::User;
use crate::blogs::repo_types::Blog;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserBlog {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub url: String,
    pub likes: i64,
}

impl From<&Blog> for UserBlog {
    fn from(b: &Blog) -> Self {
        Self {
            id: b.id,
            title: b.title.clone(),
            author: b.author.clone(),
            url: b.url.clone(),
            likes: b.likes,
        }
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub blogs: Vec<UserBlog>,
}

impl PublicUser {
    pub fn new(user: User, blogs: Vec<UserBlog>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            blogs,
        }
    }
}
