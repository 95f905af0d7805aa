use crate::state::AppState;
use axum::{routing::get, Router};

mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/lessons", get(handlers::list_lessons))
}
