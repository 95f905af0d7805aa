use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tracing::{instrument, warn};

use crate::{auth::session::OptionalSession, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page))
        .route("/register", get(register_page))
        .route("/forgot-password", get(forgot_password_page))
        .route("/reset-password/:token", get(reset_password_page))
}

async fn serve_page(static_dir: &str, file: &str) -> Response {
    let path = std::path::Path::new(static_dir).join(file);
    match tokio::fs::read_to_string(&path).await {
        Ok(contents) => Html(contents).into_response(),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "static page missing");
            (StatusCode::NOT_FOUND, "page not found").into_response()
        }
    }
}

/// Dashboard; anonymous visitors are bounced to the login page.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
) -> Response {
    match session {
        Some(_) => serve_page(&state.config.static_dir, "index.html").await,
        None => Redirect::to("/login").into_response(),
    }
}

pub async fn login_page(State(state): State<AppState>) -> Response {
    serve_page(&state.config.static_dir, "login.html").await
}

pub async fn register_page(State(state): State<AppState>) -> Response {
    serve_page(&state.config.static_dir, "register.html").await
}

pub async fn forgot_password_page(State(state): State<AppState>) -> Response {
    serve_page(&state.config.static_dir, "forgot-password.html").await
}

/// Landing page for reset links; the token in the path is consumed by the
/// form's POST, not here.
pub async fn reset_password_page(
    State(state): State<AppState>,
    Path(_token): Path<String>,
) -> Response {
    serve_page(&state.config.static_dir, "reset-password.html").await
}
