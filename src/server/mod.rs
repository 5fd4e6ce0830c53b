mod articles;
mod auth;
mod middleware;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{middleware::from_fn_with_state, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::auth::JwtService;
use crate::db::Repository;
use crate::error::AppError;
use crate::services::ArticleProcessor;

pub use middleware::AuthUser;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Repository>,
    pub processor: Arc<ArticleProcessor>,
    pub jwt: Arc<JwtService>,
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/articles", post(articles::submit_article).get(articles::list_articles))
        .route(
            "/articles/:id",
            get(articles::get_article).delete(articles::delete_article),
        )
        .route("/articles/:id/status", put(articles::update_status))
        .route("/articles/:id/tags", put(articles::update_tags))
        .route("/tags", get(articles::list_tags))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Token(_) => (
                StatusCode::UNAUTHORIZED,
                "invalid or expired token".to_string(),
            ),
            _ => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}
