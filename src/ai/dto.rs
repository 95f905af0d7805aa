use serde::{Deserialize, Serialize};

/// Request body for a code review.
#[derive(Debug, Deserialize)]
pub struct CodeReviewRequest {
    pub code: String,
}

/// Tutor feedback returned on success.
#[derive(Debug, Serialize)]
pub struct CodeReviewResponse {
    pub feedback: String,
}
