use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::AppError;

use super::AppState;

/// The authenticated caller, injected into request extensions once the
/// bearer token checks out. Every store access downstream is scoped by
/// this id.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
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

    if state.store.is_token_revoked(token).await? {
        return Err(AppError::Unauthorized("token has been revoked".to_string()));
    }

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
    });

    Ok(next.run(request).await)
}
