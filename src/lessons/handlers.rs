use axum::Json;
use tracing::instrument;

use crate::{auth::session::AuthSession, lessons::dto::Lesson};

/// Curriculum is a fixed catalog for now; no store-backed lessons yet.
fn lesson_catalog() -> Vec<Lesson> {
    vec![
        Lesson {
            id: 1,
            title: "Introduction to Python".into(),
            description: "Learn the basics of Python programming".into(),
            difficulty: "Beginner".into(),
        },
        Lesson {
            id: 2,
            title: "Web Development Fundamentals".into(),
            description: "HTML, CSS, and JavaScript basics".into(),
            difficulty: "Beginner".into(),
        },
    ]
}

#[instrument(skip_all)]
pub async fn list_lessons(AuthSession(_identity): AuthSession) -> Json<Vec<Lesson>> {
    Json(lesson_catalog())
}
