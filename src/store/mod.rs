use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    blogs::repo_types::{Blog, BlogChanges, NewBlog},
    users::repo_types::{NewUser, User},
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for blogs and users.
///
/// `list_blogs` returns blogs in creation order. Blog ownership lives on
/// `Blog::owner`; `User::blog_ids` is a denormalized index that callers keep
/// in sync through `add_user_blog` and `remove_user_blog`, each applied
/// atomically by the store.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_blogs(&self) -> StoreResult<Vec<Blog>>;
    async fn find_blog(&self, id: Uuid) -> StoreResult<Option<Blog>>;
    async fn create_blog(&self, blog: NewBlog) -> StoreResult<Blog>;
    async fn update_blog(&self, id: Uuid, changes: BlogChanges) -> StoreResult<Option<Blog>>;
    /// Returns `false` when no blog with `id` existed.
    async fn delete_blog(&self, id: Uuid) -> StoreResult<bool>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    /// Fails with `StoreError::Conflict` when the username is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn add_user_blog(&self, user_id: Uuid, blog_id: Uuid) -> StoreResult<()>;
    /// Removes every occurrence of `blog_id`; a no-op when it is not indexed.
    async fn remove_user_blog(&self, user_id: Uuid, blog_id: Uuid) -> StoreResult<()>;
}
