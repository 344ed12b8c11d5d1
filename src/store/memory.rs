use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::{
    blogs::repo_types::{Blog, BlogChanges, NewBlog},
    users::repo_types::{NewUser, User},
};

#[derive(Default)]
struct Inner {
    blogs: Vec<Blog>, // creation order
    users: Vec<User>,
}

/// Process-local store used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_blogs(&self) -> StoreResult<Vec<Blog>> {
        Ok(self.inner.read().await.blogs.clone())
    }

    async fn find_blog(&self, id: Uuid) -> StoreResult<Option<Blog>> {
        let inner = self.inner.read().await;
        Ok(inner.blogs.iter().find(|b| b.id == id).cloned())
    }

    async fn create_blog(&self, blog: NewBlog) -> StoreResult<Blog> {
        let record = Blog {
            id: Uuid::new_v4(),
            title: blog.title,
            author: blog.author,
            url: blog.url,
            likes: blog.likes,
            owner: blog.owner,
            created_at: OffsetDateTime::now_utc(),
        };
        self.inner.write().await.blogs.push(record.clone());
        Ok(record)
    }

    async fn update_blog(&self, id: Uuid, changes: BlogChanges) -> StoreResult<Option<Blog>> {
        let mut inner = self.inner.write().await;
        let Some(blog) = inner.blogs.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        changes.apply(blog);
        Ok(Some(blog.clone()))
    }

    async fn delete_blog(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.blogs.len();
        inner.blogs.retain(|b| b.id != id);
        Ok(inner.blogs.len() != before)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "username {} is already taken",
                user.username
            )));
        }
        let record = User {
            id: Uuid::new_v4(),
            username: user.username,
            name: user.name,
            password_hash: user.password_hash,
            blog_ids: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.push(record.clone());
        Ok(record)
    }

    async fn add_user_blog(&self, user_id: Uuid, blog_id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            if !user.blog_ids.contains(&blog_id) {
                user.blog_ids.push(blog_id);
            }
        }
        Ok(())
    }

    async fn remove_user_blog(&self, user_id: Uuid, blog_id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            user.blog_ids.retain(|b| *b != blog_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            name: "Test".into(),
            password_hash: "hash".into(),
        }
    }

    fn new_blog(title: &str, owner: Uuid) -> NewBlog {
        NewBlog {
            title: title.into(),
            author: None,
            url: "www.example.org".into(),
            likes: 0,
            owner,
        }
    }

    #[tokio::test]
    async fn blogs_are_listed_in_creation_order() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        for title in ["first", "second", "third"] {
            store.create_blog(new_blog(title, owner)).await.unwrap();
        }
        let titles: Vec<_> = store
            .list_blogs()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn delete_reports_missing_blog() {
        let store = MemoryStore::new();
        let blog = store.create_blog(new_blog("gone", Uuid::new_v4())).await.unwrap();
        assert!(store.delete_blog(blog.id).await.unwrap());
        assert!(!store.delete_blog(blog.id).await.unwrap());
        assert!(store.find_blog(blog.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_only_touches_given_fields() {
        let store = MemoryStore::new();
        let blog = store.create_blog(new_blog("keep", Uuid::new_v4())).await.unwrap();
        let updated = store
            .update_blog(
                blog.id,
                BlogChanges {
                    likes: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .expect("blog exists");
        assert_eq!(updated.title, "keep");
        assert_eq!(updated.likes, 7);
        assert!(store
            .update_blog(Uuid::new_v4(), BlogChanges::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let store = MemoryStore::new();
        store.create_user(new_user("root")).await.unwrap();
        let err = store.create_user(new_user("root")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn user_blog_index_appends_and_removes_by_identity() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("mluukkai")).await.unwrap();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.add_user_blog(user.id, a).await.unwrap();
        store.add_user_blog(user.id, b).await.unwrap();
        store.add_user_blog(user.id, a).await.unwrap();
        let found = store.find_user(user.id).await.unwrap().expect("user exists");
        assert_eq!(found.blog_ids, vec![a, b]);

        store.remove_user_blog(user.id, a).await.unwrap();
        store.remove_user_blog(user.id, Uuid::new_v4()).await.unwrap();
        let found = store.find_user(user.id).await.unwrap().expect("user exists");
        assert_eq!(found.blog_ids, vec![b]);
    }
}
