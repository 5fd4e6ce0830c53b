use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

use readlater::auth::JwtService;
use readlater::db::Repository;
use readlater::error::{FetchError, GenerationError};
use readlater::models::{Article, ArticleStatus, User};
use readlater::server::{self, AppState};
use readlater::services::{
    ArticleProcessor, ContentFetcher, Enricher, FetchedPage, TextGenerator,
};

// The API tests never reach the network; both backends refuse outright.

struct OfflineFetcher;

#[async_trait]
impl ContentFetcher for OfflineFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
        Err(FetchError::Transport("offline".to_string()))
    }
}

struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Empty)
    }
}

struct Api {
    state: AppState,
    token: String,
    article: Article,
    _dir: TempDir,
}

impl Api {
    fn router(&self) -> axum::Router {
        server::router(self.state.clone())
    }
}

async fn api() -> Api {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("api.db");
    let store = Arc::new(Repository::new(db_path.to_str().unwrap()).await.unwrap());

    let enricher = Arc::new(Enricher::new(Arc::new(OfflineGenerator)));
    let processor = Arc::new(ArticleProcessor::new(
        store.clone(),
        Arc::new(OfflineFetcher),
        enricher,
    ));
    let jwt = Arc::new(JwtService::new("api-test-secret"));

    let user = User::new("reader@example.com", "hash".to_string());
    store.create_user(&user).await.unwrap();
    let token = jwt.create_token(&user.id).unwrap();

    let article = Article::new(&user.id, "http://x.test/a");
    store.insert_article(&article).await.unwrap();

    Api {
        state: AppState {
            store,
            processor,
            jwt,
        },
        token,
        article,
        _dir: dir,
    }
}

fn status_request(api: &Api, status: &str) -> Request<Body> {
    Request::builder()
        .method(Method::PUT)
        .uri(format!("/articles/{}/status", api.article.id))
        .header(header::AUTHORIZATION, format!("Bearer {}", api.token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "status": status }).to_string()))
        .unwrap()
}

fn list_request(auth_header: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri("/articles");
    if let Some(value) = auth_header {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn status_updates_accept_only_read_and_unread() {
    let api = api().await;

    // The pipeline owns processing/failed; users cannot set them, and
    // unknown statuses are rejected the same way.
    for status in ["processing", "failed", "archived", ""] {
        let response = api.router().oneshot(status_request(&api, status)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "status {status:?} must be rejected"
        );
    }

    let stored = api
        .state
        .store
        .get_article(&api.article.id, &api.article.user_id)
        .await
        .unwrap();
    assert_eq!(stored.status, ArticleStatus::Processing);

    let response = api.router().oneshot(status_request(&api, "read")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = api
        .state
        .store
        .get_article(&api.article.id, &api.article.user_id)
        .await
        .unwrap();
    assert_eq!(stored.status, ArticleStatus::Read);
}

#[tokio::test]
async fn revoked_tokens_cannot_reach_protected_routes() {
    let api = api().await;
    let bearer = format!("Bearer {}", api.token);

    let response = api.router().oneshot(list_request(Some(&bearer))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    api.state
        .store
        .revoke_token(&api.token, chrono::Utc::now() + chrono::Duration::hours(24))
        .await
        .unwrap();

    let response = api.router().oneshot(list_request(Some(&bearer))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_or_malformed_authorization_is_rejected() {
    let api = api().await;

    let response = api.router().oneshot(list_request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = api
        .router()
        .oneshot(list_request(Some("Token abc")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = api
        .router()
        .oneshot(list_request(Some("Bearer not-a-real-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
