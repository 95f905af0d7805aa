use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Coding exercise row. The reference solution stays server-side only.
#[derive(Debug, Clone, FromRow)]
pub struct Problem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub category: String,
    pub initial_code: String,
    pub solution: String,
    pub created_at: OffsetDateTime,
}

/// Test case owned by a problem; hidden cases are reserved for grading.
#[derive(Debug, Clone, FromRow)]
pub struct TestCase {
    pub id: Uuid,
    pub problem_id: Uuid,
    pub input_data: String,
    pub expected_output: String,
    pub is_hidden: bool,
    pub ordinal: i32,
}

impl Problem {
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Problem>> {
        let rows = sqlx::query_as::<_, Problem>(
            r#"
            SELECT id, title, description, difficulty, category,
                   initial_code, solution, created_at
            FROM problems
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Problem>> {
        let row = sqlx::query_as::<_, Problem>(
            r#"
            SELECT id, title, description, difficulty, category,
                   initial_code, solution, created_at
            FROM problems
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }
}

impl TestCase {
    /// Visible cases only; hidden ones never leave the server on read paths.
    pub async fn list_visible(db: &PgPool, problem_id: Uuid) -> anyhow::Result<Vec<TestCase>> {
        let rows = sqlx::query_as::<_, TestCase>(
            r#"
            SELECT id, problem_id, input_data, expected_output, is_hidden, ordinal
            FROM test_cases
            WHERE problem_id = $1 AND NOT is_hidden
            ORDER BY ordinal ASC
            "#,
        )
        .bind(problem_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
