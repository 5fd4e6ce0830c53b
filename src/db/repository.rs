use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{join_tags, split_tags, Article, ArticleStatus, User};

use super::schema::SCHEMA;

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // User operations

    pub async fn create_user(&self, user: &User) -> Result<()> {
        let user = user.clone();
        let result = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO users (id, username, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        user.id,
                        user.username,
                        user.password_hash,
                        user.created_at.to_rfc3339()
                    ],
                )?;
                Ok(())
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => {
                Err(AppError::Conflict("username already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let username = username.to_string();
        let user = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
                )?;
                let user = stmt
                    .query_row(params![username], |row| Ok(user_from_row(row)))
                    .optional()?;
                Ok(user)
            })
            .await?;
        Ok(user)
    }

    // Article operations, all scoped by (id, user_id) except insertion

    pub async fn insert_article(&self, article: &Article) -> Result<()> {
        let article = article.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO articles (id, user_id, url, title, summary, tags, status, created_at, updated_at)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
                    params![
                        article.id,
                        article.user_id,
                        article.url,
                        article.title,
                        article.summary,
                        join_tags(&article.tags),
                        article.status.as_str(),
                        article.created_at.to_rfc3339(),
                        article.updated_at.to_rfc3339(),
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Rewrite every mutable field of an existing article. This is how the
    /// ingestion pipeline commits its result in one statement.
    pub async fn update_article(&self, article: &Article) -> Result<()> {
        let article = article.clone();
        let updated_at = Utc::now();
        let affected = self
            .conn
            .call(move |conn| {
                let affected = conn.execute(
                    r#"UPDATE articles
                       SET url = ?1, title = ?2, summary = ?3, tags = ?4, status = ?5, updated_at = ?6
                       WHERE id = ?7 AND user_id = ?8"#,
                    params![
                        article.url,
                        article.title,
                        article.summary,
                        join_tags(&article.tags),
                        article.status.as_str(),
                        updated_at.to_rfc3339(),
                        article.id,
                        article.user_id,
                    ],
                )?;
                Ok(affected)
            })
            .await?;

        if affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn get_article(&self, id: &str, user_id: &str) -> Result<Article> {
        let id = id.to_string();
        let user_id = user_id.to_string();
        let article = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, user_id, url, title, summary, tags, status, created_at, updated_at
                       FROM articles WHERE id = ?1 AND user_id = ?2"#,
                )?;
                let article = stmt
                    .query_row(params![id, user_id], |row| Ok(article_from_row(row)))
                    .optional()?;
                Ok(article)
            })
            .await?;
        article.ok_or(AppError::NotFound)
    }

    pub async fn set_status(&self, id: &str, user_id: &str, status: ArticleStatus) -> Result<()> {
        let id = id.to_string();
        let user_id = user_id.to_string();
        let updated_at = Utc::now();
        let affected = self
            .conn
            .call(move |conn| {
                let affected = conn.execute(
                    "UPDATE articles SET status = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
                    params![status.as_str(), updated_at.to_rfc3339(), id, user_id],
                )?;
                Ok(affected)
            })
            .await?;

        if affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn set_tags(&self, id: &str, user_id: &str, tags: &[String]) -> Result<()> {
        let id = id.to_string();
        let user_id = user_id.to_string();
        let tags_str = join_tags(tags);
        let updated_at = Utc::now();
        let affected = self
            .conn
            .call(move |conn| {
                let affected = conn.execute(
                    "UPDATE articles SET tags = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
                    params![tags_str, updated_at.to_rfc3339(), id, user_id],
                )?;
                Ok(affected)
            })
            .await?;

        if affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn delete_article(&self, id: &str, user_id: &str) -> Result<()> {
        let id = id.to_string();
        let user_id = user_id.to_string();
        let affected = self
            .conn
            .call(move |conn| {
                let affected = conn.execute(
                    "DELETE FROM articles WHERE id = ?1 AND user_id = ?2",
                    params![id, user_id],
                )?;
                Ok(affected)
            })
            .await?;

        if affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// List a user's articles, newest first. The status filter is an exact
    /// match; the tag filter is a LIKE over the comma-joined tags column, so
    /// it can match across tag boundaries.
    pub async fn list_articles(
        &self,
        user_id: &str,
        status: Option<String>,
        tag: Option<String>,
    ) -> Result<Vec<Article>> {
        let mut sql = String::from(
            r#"SELECT id, user_id, url, title, summary, tags, status, created_at, updated_at
               FROM articles WHERE user_id = ?1"#,
        );
        let mut args = vec![user_id.to_string()];

        if let Some(status) = status {
            sql.push_str(&format!(" AND status = ?{}", args.len() + 1));
            args.push(status);
        }
        if let Some(tag) = tag {
            sql.push_str(&format!(" AND tags LIKE ?{}", args.len() + 1));
            args.push(format!("%{tag}%"));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let articles = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let articles = stmt
                    .query_map(params_from_iter(args), |row| Ok(article_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    /// Distinct tags across a user's articles, unordered.
    pub async fn list_tags(&self, user_id: &str) -> Result<Vec<String>> {
        let user_id = user_id.to_string();
        let tags = self
            .conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT DISTINCT tags FROM articles WHERE user_id = ?1")?;
                let rows = stmt
                    .query_map(params![user_id], |row| row.get::<_, String>(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                let mut seen = std::collections::HashSet::new();
                let mut tags = Vec::new();
                for raw in rows {
                    for tag in split_tags(&raw) {
                        if !tag.is_empty() && seen.insert(tag.clone()) {
                            tags.push(tag);
                        }
                    }
                }
                Ok(tags)
            })
            .await?;
        Ok(tags)
    }

    // Token revocation

    pub async fn revoke_token(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let token = token.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO revoked_tokens (token, expires_at) VALUES (?1, ?2)",
                    params![token, expires_at.to_rfc3339()],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn is_token_revoked(&self, token: &str) -> Result<bool> {
        let token = token.to_string();
        let revoked = self
            .conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM revoked_tokens WHERE token = ?1",
                    params![token],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await?;
        Ok(revoked)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // RFC3339 first (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn user_from_row(row: &Row) -> User {
    User {
        id: row.get(0).unwrap(),
        username: row.get(1).unwrap(),
        password_hash: row.get(2).unwrap(),
        created_at: row
            .get::<_, String>(3)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    }
}

fn article_from_row(row: &Row) -> Article {
    Article {
        id: row.get(0).unwrap(),
        user_id: row.get(1).unwrap(),
        url: row.get(2).unwrap(),
        title: row.get(3).unwrap(),
        summary: row.get(4).unwrap(),
        tags: split_tags(&row.get::<_, String>(5).unwrap()),
        status: row
            .get::<_, String>(6)
            .unwrap()
            .parse()
            .unwrap_or(ArticleStatus::Processing),
        created_at: row
            .get::<_, String>(7)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
        updated_at: row
            .get::<_, String>(8)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    }
}
