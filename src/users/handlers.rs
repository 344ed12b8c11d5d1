use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{PublicUser, RegisterRequest, UserBlog},
    repo_types::NewUser,
};
use crate::{
    auth::password::hash_password,
    error::{AppError, AppJson},
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^\S{3,}$").expect("valid regex");
    }
    USERNAME_RE.is_match(username)
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users).post(register))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    payload.username = payload.username.trim().to_string();

    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err(AppError::Validation(
            "username must be at least 3 characters without whitespace".into(),
        ));
    }

    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .store
        .create_user(NewUser {
            username: payload.username,
            name: payload.name.trim().to_string(),
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::new(user, Vec::new()))))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, AppError> {
    let blogs: HashMap<Uuid, UserBlog> = state
        .store
        .list_blogs()
        .await?
        .iter()
        .map(|b| (b.id, UserBlog::from(b)))
        .collect();

    let users = state
        .store
        .list_users()
        .await?
        .into_iter()
        .map(|u| {
            // the index may briefly name a deleted blog
            let owned = u.blog_ids.iter().filter_map(|id| blogs.get(id).cloned()).collect();
            PublicUser::new(u, owned)
        })
        .collect();
    Ok(Json(users))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_needs_three_visible_characters() {
        assert!(is_valid_username("abc"));
        assert!(is_valid_username("mluukkai"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(""));
    }

    #[test]
    fn public_user_never_carries_password_hash() {
        let user = super::super::repo_types::User {
            id: Uuid::new_v4(),
            username: "root".into(),
            name: "Superuser".into(),
            password_hash: "$argon2id$secret".into(),
            blog_ids: vec![],
            created_at: time::OffsetDateTime::UNIX_EPOCH,
        };
        let raw = serde_json::to_string(&user).unwrap();
        assert!(!raw.contains("argon2"));
        let public = serde_json::to_string(&PublicUser::new(user, vec![])).unwrap();
        assert!(public.contains("Superuser"));
        assert!(!public.contains("password"));
    }
}
