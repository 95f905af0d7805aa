use crate::state::AppState;
use axum::{routing::post, Router};

pub mod client;
mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/ai/code-review", post(handlers::code_review))
}
