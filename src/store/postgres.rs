use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::{
    blogs::repo_types::{Blog, BlogChanges, NewBlog},
    users::repo_types::{NewUser, User},
};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

fn backend(err: sqlx::Error, what: &'static str) -> StoreError {
    StoreError::Backend(anyhow::Error::new(err).context(what))
}

#[async_trait]
impl Store for PgStore {
    async fn list_blogs(&self) -> StoreResult<Vec<Blog>> {
        sqlx::query_as::<_, Blog>(
            r#"
            SELECT id, title, author, url, likes, owner_id, created_at
            FROM blogs
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| backend(e, "list blogs"))
    }

    async fn find_blog(&self, id: Uuid) -> StoreResult<Option<Blog>> {
        sqlx::query_as::<_, Blog>(
            r#"
            SELECT id, title, author, url, likes, owner_id, created_at
            FROM blogs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| backend(e, "find blog"))
    }

    async fn create_blog(&self, blog: NewBlog) -> StoreResult<Blog> {
        sqlx::query_as::<_, Blog>(
            r#"
            INSERT INTO blogs (id, title, author, url, likes, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, author, url, likes, owner_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&blog.title)
        .bind(&blog.author)
        .bind(&blog.url)
        .bind(blog.likes)
        .bind(blog.owner)
        .fetch_one(&self.db)
        .await
        .map_err(|e| backend(e, "insert blog"))
    }

    async fn update_blog(&self, id: Uuid, changes: BlogChanges) -> StoreResult<Option<Blog>> {
        sqlx::query_as::<_, Blog>(
            r#"
            UPDATE blogs
               SET title  = COALESCE($2, title),
                   author = COALESCE($3, author),
                   url    = COALESCE($4, url),
                   likes  = COALESCE($5, likes)
             WHERE id = $1
            RETURNING id, title, author, url, likes, owner_id, created_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.author)
        .bind(changes.url)
        .bind(changes.likes)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| backend(e, "update blog"))
    }

    async fn delete_blog(&self, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| backend(e, "delete blog"))?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, name, password_hash, blog_ids, created_at
            FROM users
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| backend(e, "list users"))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, name, password_hash, blog_ids, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| backend(e, "find user"))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, name, password_hash, blog_ids, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| backend(e, "find user by username"))
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, name, password_hash, blog_ids, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("username {} is already taken", user.username))
            }
            other => backend(other, "insert user"),
        })
    }

    async fn add_user_blog(&self, user_id: Uuid, blog_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE users
               SET blog_ids = array_append(blog_ids, $2)
             WHERE id = $1 AND NOT ($2 = ANY(blog_ids))
            "#,
        )
        .bind(user_id)
        .bind(blog_id)
        .execute(&self.db)
        .await
        .map_err(|e| backend(e, "index user blog"))?;
        Ok(())
    }

    async fn remove_user_blog(&self, user_id: Uuid, blog_id: Uuid) -> StoreResult<()> {
        sqlx::query("UPDATE users SET blog_ids = array_remove(blog_ids, $2) WHERE id = $1")
            .bind(user_id)
            .bind(blog_id)
            .execute(&self.db)
            .await
            .map_err(|e| backend(e, "unindex user blog"))?;
        Ok(())
    }
}
