use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a saved article.
///
/// The ingestion pipeline moves an article from `Processing` to a terminal
/// `Unread` or `Failed`; only explicit user requests toggle between `Read`
/// and `Unread` afterwards. Nothing transitions back into `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Processing,
    Unread,
    Read,
    Failed,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Processing => "processing",
            ArticleStatus::Unread => "unread",
            ArticleStatus::Read => "read",
            ArticleStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(ArticleStatus::Processing),
            "unread" => Ok(ArticleStatus::Unread),
            "read" => Ok(ArticleStatus::Read),
            "failed" => Ok(ArticleStatus::Failed),
            other => Err(format!("unknown article status: {other}")),
        }
    }
}

/// A saved article. `id` and `user_id` never change after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub user_id: String,
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub status: ArticleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Build a freshly submitted article in `processing` status.
    pub fn new(user_id: impl Into<String>, url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            url: url.into(),
            title: String::new(),
            summary: None,
            tags: Vec::new(),
            status: ArticleStatus::Processing,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Join tags for the comma-separated storage column.
pub fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

/// Split the storage column back into tags. No trimming, no deduplication;
/// a tag of `" b"` stays `" b"`. An empty column means no tags at all.
pub fn split_tags(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ArticleStatus::Processing,
            ArticleStatus::Unread,
            ArticleStatus::Read,
            ArticleStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<ArticleStatus>().unwrap(), status);
        }
        assert!("archived".parse::<ArticleStatus>().is_err());
    }

    #[test]
    fn new_article_starts_processing() {
        let article = Article::new("user-1", "http://example.com/a");
        assert_eq!(article.status, ArticleStatus::Processing);
        assert!(article.title.is_empty());
        assert!(article.summary.is_none());
        assert!(article.tags.is_empty());
        assert_eq!(article.created_at, article.updated_at);
    }

    #[test]
    fn tags_split_preserves_whitespace() {
        assert_eq!(split_tags("a, b,c"), vec!["a", " b", "c"]);
        assert_eq!(split_tags(""), Vec::<String>::new());
        assert_eq!(join_tags(&["a".into(), " b".into()]), "a, b");
    }
}
