use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{
    auth::session::AuthSession,
    error::ApiError,
    problems::{
        dto::{ProblemDetail, ProblemSummary},
        repo::{Problem, TestCase},
    },
    state::AppState,
};

#[instrument(skip(state))]
pub async fn list_problems(
    State(state): State<AppState>,
    AuthSession(_identity): AuthSession,
) -> Result<Json<Vec<ProblemSummary>>, ApiError> {
    let problems = Problem::list(&state.db).await.map_err(|e| {
        error!(error = %e, "problem listing failed");
        ApiError::Internal(e)
    })?;
    Ok(Json(
        problems.into_iter().map(ProblemSummary::from).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_problem(
    State(state): State<AppState>,
    AuthSession(_identity): AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<ProblemDetail>, ApiError> {
    let problem = Problem::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Problem not found".into()))?;
    let cases = TestCase::list_visible(&state.db, id).await?;
    Ok(Json(ProblemDetail::from_parts(problem, cases)))
}
