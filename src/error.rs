//! Error types for po-translator

use std::path::PathBuf;

/// Everything that can go wrong while translating a catalog
#[derive(Debug, thiserror::Error)]
pub enum PoError {
    /// The backend throttled us (HTTP 429). Never retried here.
    #[error(
        "Too many requests, consider using a proxy or increasing the delay between requests"
    )]
    RateLimited,

    /// Any other non-success answer from the backend
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Transport-level failure (connection, TLS, timeout, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered 2xx but the body was not what we expected
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid API '{0}', please choose either 'deepl' or 'google'")]
    UnknownBackend(String),

    #[error("Invalid locale code: {0}")]
    InvalidLocale(String),

    #[error("Invalid exclude pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse catalog '{}': {message}", path.display())]
    CatalogParse { path: PathBuf, message: String },

    #[error("Cannot update catalog entry: {0}")]
    Entry(String),

    #[error("Failed to write catalog '{}': {message}", path.display())]
    CatalogWrite { path: PathBuf, message: String },
}

/// Result type used throughout the crate
pub type PoResult<T> = Result<T, PoError>;
