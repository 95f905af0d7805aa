use crate::state::AppState;
use axum::{routing::get, Router};

mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/problems", get(handlers::list_problems))
        .route("/api/problems/:id", get(handlers::get_problem))
}
