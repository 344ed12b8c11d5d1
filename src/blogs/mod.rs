mod dto;
pub mod guard;
pub mod handlers;
pub mod list_helper;
pub mod repo_types;
mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::blog_routes()
}
