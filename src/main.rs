use std::sync::Arc;

use readlater::auth::JwtService;
use readlater::config::Config;
use readlater::db::Repository;
use readlater::error::Result;
use readlater::server::{self, AppState};
use readlater::services::{ArticleProcessor, Enricher, GeminiClient, HttpFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::load()?;
    let api_key = config.require_gemini_api_key()?;

    if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Arc::new(Repository::new(&config.db_path).await?);
    let fetcher = Arc::new(HttpFetcher::new());
    let generator = Arc::new(GeminiClient::new(api_key));
    let enricher = Arc::new(Enricher::new(generator));
    let processor = Arc::new(ArticleProcessor::new(store.clone(), fetcher, enricher));
    let jwt = Arc::new(JwtService::new(&config.jwt_secret));

    let app = server::router(AppState {
        store,
        processor,
        jwt,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
