use axum::{
    extract::{FromRef, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, PublicUser, SigninRequest, SignupRequest, VerifyResponse},
        jwt::JwtKeys,
        password::{hash_password_async, verify_password_async},
        repo::{is_unique_violation, User},
    },
    error::ApiError,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Extracts the token from a `Bearer <token>` authorization header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() || payload.name.is_empty() {
        warn!("signup with missing fields");
        return Err(ApiError::Validation("All fields are required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email format".into()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    // Ensure email is not taken. Two concurrent signups can both pass
    // this check; the unique index on users.email settles the race below.
    match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err(ApiError::Conflict("User already exists".into()));
        }
        Ok(None) => {}
        Err(e) => return Err(ApiError::Internal(e.into())),
    }

    let hash = hash_password_async(payload.password).await?;

    let user = match User::create(&state.db, &payload.email, &hash, &payload.name).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "lost duplicate-signup race");
            return Err(ApiError::Conflict("User already exists".into()));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(ApiError::Internal(e.into()));
        }
    };

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email)?;

    info!(user_id = user.id, email = %user.email, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: PublicUser {
                id: user.id,
                email: user.email,
                name: user.name,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        warn!("signin with missing fields");
        return Err(ApiError::Validation("Email and password are required".into()));
    }

    // Unknown email and wrong password produce the same response so the
    // caller cannot enumerate accounts.
    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "signin unknown email");
            return Err(ApiError::Auth("Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::Internal(e.into()));
        }
    };

    let ok = verify_password_async(payload.password, user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = user.id, "signin invalid password");
        return Err(ApiError::Auth("Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email)?;

    info!(user_id = user.id, email = %user.email, "user signed in");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    }))
}

#[instrument(skip(state, headers))]
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<VerifyResponse>) {
    let Some(token) = bearer_token(&headers) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(VerifyResponse {
                valid: false,
                user: None,
                error: Some("No token provided".into()),
            }),
        );
    };

    let keys = JwtKeys::from_ref(&state);
    match keys.verify(token) {
        Ok(claims) => (
            StatusCode::OK,
            Json(VerifyResponse {
                valid: true,
                user: Some(claims),
                error: None,
            }),
        ),
        Err(_) => {
            warn!("invalid or expired token");
            (
                StatusCode::UNAUTHORIZED,
                Json(VerifyResponse {
                    valid: false,
                    user: None,
                    error: Some("Invalid or expired token".into()),
                }),
            )
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "auth-service is running" }))
}
