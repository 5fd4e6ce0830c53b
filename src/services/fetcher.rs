use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::FetchError;

/// A successfully retrieved page. `final_url` is the URL after redirects,
/// which replaces the submitted URL on the stored article.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub body: Vec<u8>,
}

/// One network retrieval attempt per submitted URL, no retries.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("readlater/0.1")
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        // Capture before the body read consumes the response.
        let final_url = response.url().to_string();
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .to_vec();

        Ok(FetchedPage { final_url, body })
    }
}
