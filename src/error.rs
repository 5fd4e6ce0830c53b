use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// A single network retrieval attempt failed.
///
/// Transport failures and non-success status codes are distinct variants
/// because the ingestion pipeline treats them differently: a transport
/// failure marks the article `failed`, a bad status leaves it untouched.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected status: HTTP {0}")]
    Status(u16),
}

/// Fetched bytes could not be interpreted as markup.
///
/// Missing or empty title/body elements are not parse errors; extraction
/// yields empty strings for those.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

/// A single call to the text-generation provider failed.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("empty response")]
    Empty,
}

/// Enrichment failure, tagged with the step that failed.
#[derive(Debug, Clone, Error)]
pub enum EnrichmentError {
    #[error("summary generation failed: {0}")]
    Summary(#[source] GenerationError),

    #[error("tag generation failed: {0}")]
    Tags(#[source] GenerationError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),
}
