use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::AuthConfig, state::AppState};

/// Characters of entropy in a password-reset token.
const RESET_TOKEN_LEN: usize = 48;

/// Distinguishes the long-lived session credential from the 24-hour
/// email-verification token. A token of one kind is never accepted where the
/// other is expected.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Session,
    EmailVerify,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
    pub kind: TokenKind,
}

/// Signing and verification material for all application-issued tokens.
#[derive(Clone)]
pub struct TokenKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub session_ttl: Duration,
    pub verification_ttl: Duration,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        let AuthConfig {
            secret,
            issuer,
            audience,
            session_ttl_days,
            verification_ttl_hours,
            ..
        } = state.config.auth.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            session_ttl: Duration::from_secs(session_ttl_days as u64 * 24 * 60 * 60),
            verification_ttl: Duration::from_secs(verification_ttl_hours as u64 * 60 * 60),
        }
    }
}

impl TokenKeys {
    fn sign_with_kind(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
        kind: TokenKind,
    ) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Session => self.session_ttl,
            TokenKind::EmailVerify => self.verification_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            name: name.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, kind = ?kind, "token signed");
        Ok(token)
    }

    pub fn sign_session(&self, user_id: Uuid, email: &str, name: &str) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, email, name, TokenKind::Session)
    }

    pub fn sign_verification(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
    ) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, email, name, TokenKind::EmailVerify)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    pub fn verify_session(&self, token: &str) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Session {
            anyhow::bail!("not a session token");
        }
        Ok(claims)
    }

    pub fn verify_email_token(&self, token: &str) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::EmailVerify {
            anyhow::bail!("not a verification token");
        }
        Ok(claims)
    }
}

/// Random single-use token for password resets. Stored alongside an expiry;
/// opaque to the client, unlike the signed tokens above.
pub fn generate_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> TokenKeys {
        TokenKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            verification_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }

    #[test]
    fn sign_and_verify_session_token() {
        let keys = make_keys("dev-secret");
        let user_id = Uuid::new_v4();
        let token = keys
            .sign_session(user_id, "a@example.com", "Ada")
            .expect("sign session");
        let claims = keys.verify_session(&token).expect("verify session");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.kind, TokenKind::Session);
    }

    #[test]
    fn verify_session_rejects_verification_token() {
        let keys = make_keys("dev-secret");
        let token = keys
            .sign_verification(Uuid::new_v4(), "a@example.com", "Ada")
            .expect("sign verification");
        let err = keys.verify_session(&token).unwrap_err();
        assert!(err.to_string().contains("not a session token"));
    }

    #[test]
    fn verify_email_token_rejects_session_token() {
        let keys = make_keys("dev-secret");
        let token = keys
            .sign_session(Uuid::new_v4(), "a@example.com", "Ada")
            .expect("sign session");
        let err = keys.verify_email_token(&token).unwrap_err();
        assert!(err.to_string().contains("not a verification token"));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let keys = make_keys("secret-one");
        let other = make_keys("secret-two");
        let token = keys
            .sign_session(Uuid::new_v4(), "a@example.com", "Ada")
            .expect("sign session");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@example.com".into(),
            name: "Ada".into(),
            iat: (now - TimeDuration::hours(26)).unix_timestamp() as usize,
            exp: (now - TimeDuration::hours(2)).unix_timestamp() as usize,
            iss: "test-issuer".into(),
            aud: "test-aud".into(),
            kind: TokenKind::EmailVerify,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify_email_token(&token).is_err());
    }

    #[test]
    fn reset_tokens_are_long_and_unique() {
        let first = generate_reset_token();
        let second = generate_reset_token();
        assert_eq!(first.len(), RESET_TOKEN_LEN);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
