use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

mod dto;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod session;
pub mod tokens;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(handlers::register))
        .route("/api/verify-email/:token", get(handlers::verify_email))
        .route("/api/login", post(handlers::login))
        .route("/api/forgot-password", post(handlers::forgot_password))
        .route("/api/reset-password/:token", post(handlers::reset_password))
        .route("/api/verify-session", post(handlers::verify_session))
}
