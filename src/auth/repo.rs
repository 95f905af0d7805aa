use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expiry: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, is_verified,
                   verification_token, reset_token, reset_token_expiry, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, is_verified,
                   verification_token, reset_token, reset_token_expiry, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create an unverified user holding a pending verification token.
    pub async fn create(
        db: &PgPool,
        id: Uuid,
        email: &str,
        name: &str,
        password_hash: &str,
        verification_token: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, password_hash, verification_token)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, password_hash, is_verified,
                      verification_token, reset_token, reset_token_expiry, created_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(verification_token)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Flip the verified flag and clear the token, but only if the presented
    /// token is still the stored one. Returns false for consumed or
    /// superseded tokens.
    pub async fn consume_verification_token(
        db: &PgPool,
        id: Uuid,
        token: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_verified = TRUE, verification_token = NULL
            WHERE id = $1 AND verification_token = $2
            "#,
        )
        .bind(id)
        .bind(token)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_reset_token(
        db: &PgPool,
        id: Uuid,
        token: &str,
        expiry: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_token = $2, reset_token_expiry = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expiry)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Write the new password hash and clear the reset token in one statement,
    /// so a token can never be replayed. Returns false when the token is
    /// unknown, expired, or already used.
    pub async fn consume_reset_token(
        db: &PgPool,
        token: &str,
        new_password_hash: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, reset_token = NULL, reset_token_expiry = NULL
            WHERE reset_token = $2 AND reset_token_expiry > NOW()
            "#,
        )
        .bind(new_password_hash)
        .bind(token)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Postgres unique-constraint violation (code 23505), used to map racing
/// duplicate registrations to a conflict instead of a server error.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => {
            db_err.code().is_some_and(|code| code.as_ref() == "23505")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_json_hides_credential_fields() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@example.com".into(),
            name: "Ada".into(),
            password_hash: "argon2-hash".into(),
            is_verified: true,
            verification_token: Some("vtok".into()),
            reset_token: Some("rtok".into()),
            reset_token_expiry: Some(OffsetDateTime::now_utc()),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("a@example.com"));
        assert!(!json.contains("argon2-hash"));
        assert!(!json.contains("vtok"));
        assert!(!json.contains("rtok"));
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        let err = anyhow::anyhow!("connection refused");
        assert!(!is_unique_violation(&err));
        let err: anyhow::Error = sqlx::Error::RowNotFound.into();
        assert!(!is_unique_violation(&err));
    }
}
