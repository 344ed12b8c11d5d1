use std::collections::HashMap;

use axum::{
    extract::State,
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{BlogResponse, CreateBlogRequest, OwnerSummary, StatsResponse, UpdateBlogRequest},
    guard::{authorize_delete, authorize_update},
    list_helper, services,
};
use crate::{
    auth::Authentication,
    error::{AppError, AppJson, AppPath},
    state::AppState,
};

pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/blogs", get(list_blogs).post(create_blog))
        .route("/blogs/stats", get(blog_stats))
        .route(
            "/blogs/:id",
            get(get_blog).put(update_blog).delete(delete_blog),
        )
}

#[instrument(skip(state))]
pub async fn list_blogs(State(state): State<AppState>) -> Result<Json<Vec<BlogResponse>>, AppError> {
    let blogs = state.store.list_blogs().await?;
    let owners: HashMap<Uuid, OwnerSummary> = state
        .store
        .list_users()
        .await?
        .iter()
        .map(|u| (u.id, OwnerSummary::from(u)))
        .collect();

    let items = blogs
        .into_iter()
        .map(|b| {
            let owner = owners.get(&b.owner).cloned();
            BlogResponse::new(b, owner)
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn blog_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let blogs = state.store.list_blogs().await?;
    Ok(Json(StatsResponse {
        blogs: blogs.len(),
        total_likes: list_helper::total_likes(&blogs),
        favorite_blog: list_helper::favorite_blog(&blogs),
        most_blogs: list_helper::most_blogs(&blogs),
        most_likes: list_helper::most_likes(&blogs),
    }))
}

#[instrument(skip(state))]
pub async fn get_blog(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<BlogResponse>, AppError> {
    let blog = state
        .store
        .find_blog(id)
        .await?
        .ok_or_else(|| AppError::NotFound("blog not found".into()))?;
    let owner = state.store.find_user(blog.owner).await?;
    Ok(Json(BlogResponse::new(blog, owner.as_ref().map(OwnerSummary::from))))
}

#[instrument(skip(state, auth, payload))]
pub async fn create_blog(
    State(state): State<AppState>,
    auth: Authentication,
    payload: Result<AppJson<CreateBlogRequest>, AppError>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<BlogResponse>), AppError> {
    // authentication outranks a malformed body
    let principal = auth.require()?;
    let AppJson(payload) = payload?;

    // the token may outlive its user
    let Some(owner) = state.store.find_user(principal.user_id).await? else {
        warn!(user_id = %principal.user_id, "token for unknown user");
        return Err(AppError::TokenInvalid);
    };

    let new_blog = payload.validate(owner.id)?;
    let blog = services::create_owned_blog(state.store.as_ref(), new_blog).await?;

    info!(blog_id = %blog.id, user_id = %principal.user_id, "blog created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/blogs/{}", blog.id))],
        Json(BlogResponse::new(blog, Some(OwnerSummary::from(&owner)))),
    ))
}

#[instrument(skip(state, auth, payload))]
pub async fn update_blog(
    State(state): State<AppState>,
    auth: Authentication,
    AppPath(id): AppPath<Uuid>,
    payload: Result<AppJson<UpdateBlogRequest>, AppError>,
) -> Result<Json<BlogResponse>, AppError> {
    let blog = state.store.find_blog(id).await?;
    if let Err(e) = authorize_update(&auth, blog.as_ref()).into_result() {
        warn!(blog_id = %id, error = %e, "blog update refused");
        return Err(e);
    }

    let AppJson(payload) = payload?;
    let changes = payload.validate()?;
    let updated = state
        .store
        .update_blog(id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("blog not found".into()))?;
    let owner = state.store.find_user(updated.owner).await?;

    info!(blog_id = %id, likes = updated.likes, "blog updated");
    Ok(Json(BlogResponse::new(updated, owner.as_ref().map(OwnerSummary::from))))
}

#[instrument(skip(state, auth))]
pub async fn delete_blog(
    State(state): State<AppState>,
    auth: Authentication,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let blog = state.store.find_blog(id).await?;
    if let Err(e) = authorize_delete(&auth, blog.as_ref()).into_result() {
        warn!(blog_id = %id, error = %e, "blog delete refused");
        return Err(e);
    }
    let Some(blog) = blog else {
        return Err(AppError::NotFound("blog not found".into()));
    };

    if !services::remove_blog(state.store.as_ref(), &blog).await? {
        return Err(AppError::NotFound("blog not found".into()));
    }

    info!(blog_id = %id, user_id = %blog.owner, "blog deleted");
    Ok(StatusCode::NO_CONTENT)
}
