//! One-off seeding tool: replaces the problem catalog with the two sample
//! exercises and their test cases.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use uuid::Uuid;

struct SeedCase {
    input: &'static str,
    expected: &'static str,
    hidden: bool,
}

struct SeedProblem {
    title: &'static str,
    description: &'static str,
    difficulty: &'static str,
    category: &'static str,
    initial_code: &'static str,
    solution: &'static str,
    test_cases: Vec<SeedCase>,
}

fn sample_problems() -> Vec<SeedProblem> {
    vec![
        SeedProblem {
            title: "Two Sum",
            description: "Given an array of integers nums and an integer target, \
                return indices of the two numbers in nums such that they add up to target.\n\
                You may assume that each input would have exactly one solution, \
                and you may not use the same element twice.\n\
                You can return the answer in any order.",
            difficulty: "Easy",
            category: "Arrays & Hashing",
            initial_code: "def two_sum(nums, target):\n    # Write your code here\n    pass",
            solution: "def two_sum(nums, target):\n    seen = {}\n    for i, num in enumerate(nums):\n        complement = target - num\n        if complement in seen:\n            return [seen[complement], i]\n        seen[num] = i\n    return []",
            test_cases: vec![
                SeedCase {
                    input: "[2,7,11,15], 9",
                    expected: "[0,1]",
                    hidden: false,
                },
                SeedCase {
                    input: "[3,2,4], 6",
                    expected: "[1,2]",
                    hidden: false,
                },
                SeedCase {
                    input: "[3,3], 6",
                    expected: "[0,1]",
                    hidden: true,
                },
            ],
        },
        SeedProblem {
            title: "Valid Parentheses",
            description: "Given a string s containing just the characters '(', ')', '{', '}', '[' and ']', \
                determine if the input string is valid.\n\
                An input string is valid if:\n\
                1. Open brackets must be closed by the same type of brackets.\n\
                2. Open brackets must be closed in the correct order.\n\
                3. Every close bracket has a corresponding open bracket of the same type.",
            difficulty: "Easy",
            category: "Stack",
            initial_code: "def is_valid(s):\n    # Write your code here\n    pass",
            solution: "def is_valid(s):\n    stack = []\n    brackets = {')': '(', '}': '{', ']': '['}\n    for char in s:\n        if char in brackets.values():\n            stack.append(char)\n        elif char in brackets:\n            if not stack or stack.pop() != brackets[char]:\n                return False\n    return len(stack) == 0",
            test_cases: vec![
                SeedCase {
                    input: "()",
                    expected: "True",
                    hidden: false,
                },
                SeedCase {
                    input: "()[]{}",
                    expected: "True",
                    hidden: false,
                },
                SeedCase {
                    input: "(]",
                    expected: "False",
                    hidden: false,
                },
                SeedCase {
                    input: "([)]",
                    expected: "False",
                    hidden: true,
                },
            ],
        },
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "seed=info".to_string());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;

    // Fixture load: start from an empty catalog every time.
    sqlx::query("DELETE FROM test_cases").execute(&db).await?;
    sqlx::query("DELETE FROM problems").execute(&db).await?;

    for problem in sample_problems() {
        let problem_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO problems (title, description, difficulty, category, initial_code, solution)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(problem.title)
        .bind(problem.description)
        .bind(problem.difficulty)
        .bind(problem.category)
        .bind(problem.initial_code)
        .bind(problem.solution)
        .fetch_one(&db)
        .await
        .with_context(|| format!("insert problem {}", problem.title))?;

        for (ordinal, case) in problem.test_cases.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO test_cases (problem_id, input_data, expected_output, is_hidden, ordinal)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(problem_id)
            .bind(case.input)
            .bind(case.expected)
            .bind(case.hidden)
            .bind(ordinal as i32)
            .execute(&db)
            .await
            .with_context(|| format!("insert test case {ordinal} for {}", problem.title))?;
        }

        info!(
            title = problem.title,
            cases = problem.test_cases.len(),
            "seeded problem"
        );
    }

    info!("seeding complete");
    Ok(())
}
