use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Article, ArticleStatus};

use super::{AppState, AuthUser, MessageResponse};

#[derive(Debug, Deserialize)]
pub struct SubmitArticleRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ListArticlesQuery {
    pub status: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTagsRequest {
    pub tags: Vec<String>,
}

/// Create the article and answer immediately; ingestion runs detached.
pub async fn submit_article(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SubmitArticleRequest>,
) -> Result<(StatusCode, Json<Article>)> {
    if req.url.is_empty() {
        return Err(AppError::BadRequest("url is required".to_string()));
    }

    let (article, _ingestion) = state.processor.submit(&user.user_id, req.url).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn list_articles(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<Json<Vec<Article>>> {
    let articles = state
        .store
        .list_articles(&user.user_id, query.status, query.tag)
        .await?;
    Ok(Json(articles))
}

pub async fn get_article(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Article>> {
    let article = state.store.get_article(&id, &user.user_id).await?;
    Ok(Json(article))
}

pub async fn delete_article(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.store.delete_article(&id, &user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Users may only toggle between read and unread; the pipeline owns the
/// rest of the lifecycle.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<MessageResponse>> {
    let status = match req.status.parse::<ArticleStatus>() {
        Ok(status @ (ArticleStatus::Read | ArticleStatus::Unread)) => status,
        _ => {
            return Err(AppError::BadRequest(
                "status must be 'read' or 'unread'".to_string(),
            ))
        }
    };

    state.store.set_status(&id, &user.user_id, status).await?;
    Ok(Json(MessageResponse {
        message: "Status updated successfully".to_string(),
    }))
}

pub async fn update_tags(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTagsRequest>,
) -> Result<Json<MessageResponse>> {
    if req.tags.is_empty() {
        return Err(AppError::BadRequest("tags cannot be empty".to_string()));
    }

    state.store.set_tags(&id, &user.user_id, &req.tags).await?;
    Ok(Json(MessageResponse {
        message: "Tags updated successfully".to_string(),
    }))
}

pub async fn list_tags(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<String>>> {
    let tags = state.store.list_tags(&user.user_id).await?;
    Ok(Json(tags))
}
