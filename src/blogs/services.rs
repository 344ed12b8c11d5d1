use anyhow::Context;
use tracing::debug;

use super::repo_types::{Blog, NewBlog};
use crate::{
    error::AppError,
    store::{Store, StoreResult},
};

/// Persists the blog and appends its id to the owner's blog index.
pub async fn create_owned_blog(store: &dyn Store, blog: NewBlog) -> Result<Blog, AppError> {
    let saved = store.create_blog(blog).await?;

    store
        .add_user_blog(saved.owner, saved.id)
        .await
        .map_err(anyhow::Error::from)
        .with_context(|| format!("index blog {} for user {}", saved.id, saved.owner))?;

    Ok(saved)
}

/// Drops `blog` from its owner's index, then deletes it.
///
/// Returns `false` if the blog was already gone, e.g. removed by a concurrent
/// request between lookup and delete.
pub async fn remove_blog(store: &dyn Store, blog: &Blog) -> StoreResult<bool> {
    store.remove_user_blog(blog.owner, blog.id).await?;
    let deleted = store.delete_blog(blog.id).await?;
    debug!(blog_id = %blog.id, deleted, "blog delete");
    Ok(deleted)
}
