use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    list_helper::{Aggregate, AuthorBlogs, AuthorLikes, FavoriteBlog},
    repo_types::{Blog, BlogChanges, NewBlog},
};
use crate::{error::AppError, users::repo_types::User};

#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

/// Any subset of the mutable fields.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

fn non_negative(likes: i64) -> Result<i64, AppError> {
    if likes < 0 {
        return Err(AppError::Validation("likes must not be negative".into()));
    }
    Ok(likes)
}

impl CreateBlogRequest {
    pub fn validate(self, owner: Uuid) -> Result<NewBlog, AppError> {
        Ok(NewBlog {
            title: required("title", self.title)?,
            url: required("url", self.url)?,
            author: self.author,
            likes: non_negative(self.likes.unwrap_or(0))?,
            owner,
        })
    }
}

impl UpdateBlogRequest {
    pub fn validate(self) -> Result<BlogChanges, AppError> {
        Ok(BlogChanges {
            title: self.title.map(|t| required("title", Some(t))).transpose()?,
            url: self.url.map(|u| required("url", Some(u))).transpose()?,
            author: self.author,
            likes: self.likes.map(non_negative).transpose()?,
        })
    }
}

/// Owner fields embedded in blog responses.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerSummary {
    pub id: Uuid,
    pub username: String,
    pub name: String,
}

impl From<&User> for OwnerSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            name: u.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BlogResponse {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub url: String,
    pub likes: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user: Option<OwnerSummary>, // None when the owner no longer resolves
}

impl BlogResponse {
    pub fn new(blog: Blog, owner: Option<OwnerSummary>) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            author: blog.author,
            url: blog.url,
            likes: blog.likes,
            created_at: blog.created_at,
            user: owner,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub blogs: usize,
    pub total_likes: i64,
    pub favorite_blog: Aggregate<FavoriteBlog>,
    pub most_blogs: Aggregate<AuthorBlogs>,
    pub most_likes: Aggregate<AuthorLikes>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_likes_to_zero() {
        let req = CreateBlogRequest {
            title: Some("Title".into()),
            author: None,
            url: Some("www.example.org".into()),
            likes: None,
        };
        let owner = Uuid::new_v4();
        let blog = req.validate(owner).expect("valid");
        assert_eq!(blog.likes, 0);
        assert_eq!(blog.owner, owner);
    }

    #[test]
    fn create_requires_title_and_url() {
        let no_title = CreateBlogRequest {
            title: None,
            author: None,
            url: Some("www.example.org".into()),
            likes: None,
        };
        assert!(matches!(no_title.validate(Uuid::nil()), Err(AppError::Validation(m)) if m.contains("title")));

        let blank_url = CreateBlogRequest {
            title: Some("Title".into()),
            author: None,
            url: Some("   ".into()),
            likes: None,
        };
        assert!(matches!(blank_url.validate(Uuid::nil()), Err(AppError::Validation(m)) if m.contains("url")));
    }

    #[test]
    fn create_rejects_negative_likes() {
        let req = CreateBlogRequest {
            title: Some("Title".into()),
            author: None,
            url: Some("u".into()),
            likes: Some(-1),
        };
        assert!(req.validate(Uuid::nil()).is_err());
    }

    #[test]
    fn update_passes_through_absent_fields() {
        let changes = UpdateBlogRequest {
            likes: Some(3),
            ..Default::default()
        }
        .validate()
        .expect("valid");
        assert_eq!(changes.likes, Some(3));
        assert!(changes.title.is_none());
        assert!(changes.url.is_none());
    }

    #[test]
    fn update_rejects_blank_title() {
        let req = UpdateBlogRequest {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
