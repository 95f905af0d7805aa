use axum::{extract::State, Json};
use tracing::{error, instrument};

use crate::{
    ai::dto::{CodeReviewRequest, CodeReviewResponse},
    auth::session::AuthSession,
    error::ApiError,
    state::AppState,
};

#[instrument(skip(state, payload))]
pub async fn code_review(
    State(state): State<AppState>,
    AuthSession(identity): AuthSession,
    Json(payload): Json<CodeReviewRequest>,
) -> Result<Json<CodeReviewResponse>, ApiError> {
    let limit = state.config.ai.max_code_bytes;
    if payload.code.len() > limit {
        return Err(ApiError::Validation(format!(
            "Submitted code exceeds the {limit} byte limit"
        )));
    }

    match state.reviewer.review(&payload.code).await {
        Ok(feedback) => Ok(Json(CodeReviewResponse { feedback })),
        Err(e) => {
            error!(error = %e, user_id = %identity.id, "code review upstream call failed");
            Err(ApiError::Upstream(e.to_string()))
        }
    }
}
