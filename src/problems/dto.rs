use serde::Serialize;
use uuid::Uuid;

use crate::problems::repo::{Problem, TestCase};

/// Catalog entry for the problem list.
#[derive(Debug, Serialize)]
pub struct ProblemSummary {
    pub id: Uuid,
    pub title: String,
    pub difficulty: String,
    pub category: String,
}

/// Full problem view: starter code plus the visible test cases. The reference
/// solution and hidden cases are deliberately absent.
#[derive(Debug, Serialize)]
pub struct ProblemDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub category: String,
    pub initial_code: String,
    pub test_cases: Vec<PublicTestCase>,
}

#[derive(Debug, Serialize)]
pub struct PublicTestCase {
    pub input: String,
    pub expected_output: String,
}

impl From<Problem> for ProblemSummary {
    fn from(problem: Problem) -> Self {
        Self {
            id: problem.id,
            title: problem.title,
            difficulty: problem.difficulty,
            category: problem.category,
        }
    }
}

impl ProblemDetail {
    pub fn from_parts(problem: Problem, cases: Vec<TestCase>) -> Self {
        Self {
            id: problem.id,
            title: problem.title,
            description: problem.description,
            difficulty: problem.difficulty,
            category: problem.category,
            initial_code: problem.initial_code,
            test_cases: cases
                .into_iter()
                .map(|case| PublicTestCase {
                    input: case.input_data,
                    expected_output: case.expected_output,
                })
                .collect(),
        }
    }
}
