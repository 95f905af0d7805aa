use serde::Serialize;

/// Lesson summary shown on the dashboard.
#[derive(Debug, Serialize)]
pub struct Lesson {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub difficulty: String,
}
