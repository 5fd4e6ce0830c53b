use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::db::Repository;
use crate::error::{AppError, FetchError, Result};
use crate::models::{Article, ArticleStatus};

use super::enrichment::Enricher;
use super::extractor;
use super::fetcher::ContentFetcher;

/// The asynchronous ingestion pipeline: fetch, extract, enrich, persist.
///
/// Each submission gets exactly one best-effort run. Only a fetch transport
/// failure reaches the terminal `failed` status; every later failure is
/// logged and leaves the article in `processing`. That asymmetry is
/// deliberate: "network unreachable" is reported to the user, a broken
/// downstream step is not.
#[derive(Clone)]
pub struct ArticleProcessor {
    store: Arc<Repository>,
    fetcher: Arc<dyn ContentFetcher>,
    enricher: Arc<Enricher>,
}

impl ArticleProcessor {
    pub fn new(
        store: Arc<Repository>,
        fetcher: Arc<dyn ContentFetcher>,
        enricher: Arc<Enricher>,
    ) -> Self {
        Self {
            store,
            fetcher,
            enricher,
        }
    }

    /// Create the article in `processing` status and launch ingestion as a
    /// detached task. The caller gets the created article immediately and
    /// may drop the join handle; nothing downstream blocks on the run.
    pub async fn submit(&self, user_id: &str, url: String) -> Result<(Article, JoinHandle<()>)> {
        let article = Article::new(user_id, url);
        self.store.insert_article(&article).await?;

        let processor = self.clone();
        let task_article = article.clone();
        let handle = tokio::spawn(async move {
            processor.run(task_article).await;
        });

        Ok((article, handle))
    }

    /// One ingestion attempt. Never returns an error; every failure is
    /// handled here because the submitter has already been answered.
    pub async fn run(&self, mut article: Article) {
        tracing::debug!(article_id = %article.id, url = %article.url, "starting ingestion");

        let page = match self.fetcher.fetch(&article.url).await {
            Ok(page) => page,
            Err(FetchError::Transport(reason)) => {
                tracing::warn!(article_id = %article.id, %reason, "fetch failed");
                article.status = ArticleStatus::Failed;
                if let Err(e) = self.store.update_article(&article).await {
                    tracing::warn!(article_id = %article.id, error = %e, "could not persist failed status");
                }
                return;
            }
            Err(FetchError::Status(code)) => {
                // Stays in processing; see module docs.
                tracing::warn!(article_id = %article.id, code, "fetch returned non-success status");
                return;
            }
        };

        let text = match extractor::extract(&page.body) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(article_id = %article.id, error = %e, "could not parse page");
                return;
            }
        };

        article.title = if text.title.trim().is_empty() {
            tracing::debug!(article_id = %article.id, "no title found, falling back to URL");
            article.url.clone()
        } else {
            text.title
        };
        // Redirects collapse to their target.
        article.url = page.final_url;

        let summary = match self.enricher.summarize(&text.body).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(article_id = %article.id, error = %e, "enrichment failed");
                return;
            }
        };

        let tags = match self.enricher.tag_list(&text.body).await {
            Ok(tags) => tags,
            Err(e) => {
                tracing::warn!(article_id = %article.id, error = %e, "enrichment failed");
                return;
            }
        };

        article.summary = Some(summary);
        article.tags = tags;
        article.status = ArticleStatus::Unread;

        match self.store.update_article(&article).await {
            Ok(()) => {
                tracing::info!(article_id = %article.id, "article processed");
            }
            // Owner deleted the article mid-flight; nothing to report.
            Err(AppError::NotFound) => {
                tracing::debug!(article_id = %article.id, "article gone before commit");
            }
            Err(e) => {
                tracing::warn!(article_id = %article.id, error = %e, "could not persist processed article");
            }
        }
    }
}
