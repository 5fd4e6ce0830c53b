use std::sync::OnceLock;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, verify_password};
use crate::error::{AppError, Result};
use crate::models::User;

use super::{AppState, MessageResponse};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$")
            .expect("valid email regex")
    })
}

fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "username and password are required".to_string(),
        ));
    }
    if !email_regex().is_match(username) {
        return Err(AppError::BadRequest(
            "username must be a valid email address".to_string(),
        ));
    }
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    validate_credentials(&req.username, &req.password)?;

    if state
        .store
        .get_user_by_username(&req.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "username '{}' already exists",
            req.username
        )));
    }

    let user = User::new(&req.username, hash_password(&req.password)?);
    state.store.create_user(&user).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    validate_credentials(&req.username, &req.password)?;

    // Same answer whether the user is missing or the password is wrong.
    let user = state
        .store
        .get_user_by_username(&req.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid username or password".to_string()))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(AppError::Unauthorized(
            "invalid username or password".to_string(),
        ));
    }

    let token = state.jwt.create_token(&user.id)?;
    Ok(Json(TokenResponse { token }))
}

/// Revoke the presented token until its natural expiry.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("authorization header is required".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("invalid authorization header format".to_string()))?;

    let claims = state
        .jwt
        .verify_token(token)
        .map_err(|_| AppError::Unauthorized("invalid or expired token".to_string()))?;

    state.store.revoke_token(token, claims.expires_at()).await?;

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}
