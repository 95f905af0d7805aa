use anyhow::Context;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{
        header::{AUTHORIZATION, COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{auth::repo::User, auth::tokens::TokenKeys, error::ApiError, state::AppState};

/// Cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "authToken";

/// Verified caller identity attached to protected handlers.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(COOKIE)?.to_str().ok()?;
    value.split(';').find_map(|pair| {
        let (key, val) = pair.trim().split_once('=')?;
        (key.trim() == SESSION_COOKIE).then(|| val.trim().to_string())
    })
}

/// `Authorization: Bearer` preferred; `authToken` cookie as fallback.
pub(crate) fn extract_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| cookie_token(headers))
}

/// Resolve request credentials to a verified identity.
///
/// Missing, malformed, expired, unknown-user, unverified-account, and
/// store-failure cases all resolve to `None`; callers cannot distinguish
/// which one occurred.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Option<Identity> {
    let token = extract_token(headers)?;

    let keys = TokenKeys::from_ref(state);
    let claims = match keys.verify_session(&token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "session token rejected");
            return None;
        }
    };

    let user = match User::find_by_id(&state.db, claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(user_id = %claims.sub, "session token for unknown user");
            return None;
        }
        Err(e) => {
            error!(error = %e, "user lookup failed during session check");
            return None;
        }
    };

    if !user.is_verified {
        debug!(user_id = %user.id, "session rejected for unverified account");
        return None;
    }

    Some(Identity {
        id: user.id,
        email: user.email,
        name: user.name,
    })
}

/// Required-session extractor: protected API routes take this and get a 401
/// JSON rejection when the request carries no usable credential.
pub struct AuthSession(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(state, &parts.headers)
            .await
            .map(AuthSession)
            .ok_or_else(ApiError::unauthenticated)
    }
}

/// Optional-session extractor: never rejects, used where unauthenticated
/// requests get a non-error response (session probe, page redirects).
pub struct OptionalSession(pub Option<Identity>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalSession(authenticate(state, &parts.headers).await))
    }
}

/// HTTP-only session cookie; `Secure` only when the site is served over TLS.
pub fn session_cookie(
    token: &str,
    max_age_secs: u64,
    secure: bool,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// `Set-Cookie` headers for a freshly issued session token.
pub fn session_set_cookie(state: &AppState, token: &str) -> anyhow::Result<HeaderMap> {
    let max_age = state.config.auth.session_ttl_days as u64 * 24 * 60 * 60;
    let value = session_cookie(token, max_age, state.config.auth.cookie_secure)
        .context("build session cookie")?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, value);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, COOKIE};

    fn headers_with(pairs: &[(axum::http::HeaderName, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(name.clone(), value.parse().unwrap());
        }
        headers
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let headers = headers_with(&[
            (AUTHORIZATION, "Bearer header-token"),
            (COOKIE, "authToken=cookie-token"),
        ]);
        assert_eq!(extract_token(&headers).as_deref(), Some("header-token"));
    }

    #[test]
    fn cookie_is_found_among_other_cookies() {
        let headers = headers_with(&[(COOKIE, "theme=dark; authToken=tok123; lang=en")]);
        assert_eq!(extract_token(&headers).as_deref(), Some("tok123"));
    }

    #[test]
    fn malformed_auth_header_falls_back_to_cookie() {
        let headers = headers_with(&[(AUTHORIZATION, "Token abc"), (COOKIE, "authToken=tok")]);
        assert_eq!(extract_token(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn no_credentials_means_no_token() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
        let unrelated = headers_with(&[(COOKIE, "theme=dark")]);
        assert_eq!(extract_token(&unrelated), None);
    }

    #[test]
    fn session_cookie_sets_browser_attributes() {
        let value = session_cookie("tok", 604800, false).unwrap();
        let cookie = value.to_str().unwrap();
        assert!(cookie.starts_with("authToken=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));

        let secure = session_cookie("tok", 604800, true).unwrap();
        assert!(secure.to_str().unwrap().contains("Secure"));
    }

    #[tokio::test]
    async fn authenticate_without_credentials_is_none() {
        let state = AppState::fake();
        assert!(authenticate(&state, &HeaderMap::new()).await.is_none());
    }

    #[tokio::test]
    async fn authenticate_with_garbage_token_is_none() {
        let state = AppState::fake();
        let headers = headers_with(&[(AUTHORIZATION, "Bearer not-a-jwt")]);
        assert!(authenticate(&state, &headers).await.is_none());
    }

    #[tokio::test]
    async fn authenticate_survives_unreachable_store() {
        // Valid signature, but the fake state's pool points at nothing: the
        // lookup failure must degrade to unauthenticated, not an error.
        let state = AppState::fake();
        let keys = TokenKeys::from_ref(&state);
        let token = keys
            .sign_session(Uuid::new_v4(), "a@example.com", "Ada")
            .unwrap();
        let bearer = format!("Bearer {token}");
        let headers = headers_with(&[(AUTHORIZATION, bearer.as_str())]);
        assert!(authenticate(&state, &headers).await.is_none());
    }
}
