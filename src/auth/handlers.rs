use axum::{
    extract::{FromRef, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, PublicUser,
            RegisterRequest, ResetPasswordRequest, SessionResponse,
        },
        password::{hash_password, verify_password},
        repo::{is_unique_violation, User},
        session::{session_set_cookie, OptionalSession},
        tokens::{generate_reset_token, TokenKeys},
    },
    error::ApiError,
    mail,
    state::AppState,
};

/// Returned for every forgot-password request; must not vary with account
/// existence.
const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";

const INVALID_VERIFICATION: &str = "Invalid or expired verification link";
const INVALID_RESET: &str = "Invalid or expired reset token";

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    let name = payload.name.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::Validation("Password too short".into()));
    }

    // Friendly pre-check; the unique index still backstops races below.
    if let Ok(Some(_)) = User::find_by_email(&state.db, &payload.email).await {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;

    let keys = TokenKeys::from_ref(&state);
    let user_id = Uuid::new_v4();
    let verification_token = keys.sign_verification(user_id, &payload.email, &name)?;

    let user = match User::create(
        &state.db,
        user_id,
        &payload.email,
        &name,
        &hash,
        &verification_token,
    )
    .await
    {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "email already registered");
            return Err(ApiError::Conflict("Email already registered".into()));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(e.into());
        }
    };

    let (subject, body) =
        mail::verification_email(&state.config.mail.base_url, &user.name, &verification_token);
    if let Err(e) = state.mailer.send(&user.email, &subject, &body).await {
        error!(error = %e, user_id = %user.id, "verification email dispatch failed");
        return Err(ApiError::Upstream(e.to_string()));
    }

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Registration successful. Check your email to verify your account.".into(),
        }),
    ))
}

#[instrument(skip(state, token))]
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let keys = TokenKeys::from_ref(&state);
    let claims = keys.verify_email_token(&token).map_err(|e| {
        debug!(error = %e, "verification token rejected");
        ApiError::Validation(INVALID_VERIFICATION.into())
    })?;

    // The signature bounds the 24h window; the stored-token match rejects
    // links superseded by a newer issuance.
    let consumed = User::consume_verification_token(&state.db, claims.sub, &token).await?;
    if !consumed {
        warn!(user_id = %claims.sub, "verification token already used or superseded");
        return Err(ApiError::Validation(INVALID_VERIFICATION.into()));
    }

    info!(user_id = %claims.sub, "email verified");
    Ok(Json(MessageResponse {
        message: "Email verified. You can now log in.".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Unauthenticated("Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(e.into());
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthenticated("Invalid credentials".into()));
    }

    // Correct password on an unverified account gets the distinct error.
    if !user.is_verified {
        warn!(user_id = %user.id, "login before email verification");
        return Err(ApiError::Unauthenticated(
            "Please verify your email before logging in".into(),
        ));
    }

    let keys = TokenKeys::from_ref(&state);
    let token = keys.sign_session(user.id, &user.email, &user.name)?;
    let headers = session_set_cookie(&state, &token)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        headers,
        Json(LoginResponse {
            message: "Login successful".into(),
            user: PublicUser {
                id: user.id,
                email: user.email,
                name: user.name,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    // Failures on this path are logged but never surfaced: the response body
    // is identical whether or not the account exists.
    match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(user)) => {
            let token = generate_reset_token();
            let expiry = OffsetDateTime::now_utc()
                + TimeDuration::hours(state.config.auth.reset_ttl_hours);
            if let Err(e) = User::set_reset_token(&state.db, user.id, &token, expiry).await {
                error!(error = %e, user_id = %user.id, "storing reset token failed");
            } else {
                let (subject, body) =
                    mail::reset_email(&state.config.mail.base_url, &user.name, &token);
                match state.mailer.send(&user.email, &subject, &body).await {
                    Ok(()) => info!(user_id = %user.id, "password reset email sent"),
                    Err(e) => {
                        error!(error = %e, user_id = %user.id, "reset email dispatch failed")
                    }
                }
            }
        }
        Ok(None) => {
            debug!(email = %payload.email, "password reset requested for unknown email");
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
        }
    }

    Ok(Json(MessageResponse {
        message: FORGOT_PASSWORD_MESSAGE.into(),
    }))
}

#[instrument(skip(state, token, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.password.len() < 8 {
        return Err(ApiError::Validation("Password too short".into()));
    }

    let hash = hash_password(&payload.password)?;
    let consumed = User::consume_reset_token(&state.db, &token, &hash).await?;
    if !consumed {
        warn!("reset token invalid, expired, or already used");
        return Err(ApiError::Validation(INVALID_RESET.into()));
    }

    info!("password reset completed");
    Ok(Json(MessageResponse {
        message: "Password updated. You can now log in.".into(),
    }))
}

#[instrument(skip(state, session))]
pub async fn verify_session(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
) -> Response {
    match session {
        Some(identity) => {
            let keys = TokenKeys::from_ref(&state);
            let refreshed = keys
                .sign_session(identity.id, &identity.email, &identity.name)
                .and_then(|token| session_set_cookie(&state, &token));
            match refreshed {
                Ok(headers) => (
                    headers,
                    Json(SessionResponse {
                        authenticated: true,
                        user: Some(identity.into()),
                    }),
                )
                    .into_response(),
                Err(e) => {
                    error!(error = %e, "session refresh failed");
                    ApiError::Internal(e).into_response()
                }
            }
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(SessionResponse {
                authenticated: false,
                user: None,
            }),
        )
            .into_response(),
    }
}
