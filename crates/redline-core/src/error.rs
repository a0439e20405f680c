//! Error types for Redline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Rejected settings; raised before any detection work starts.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The judge refused the call due to quota. Callers may retry later.
    #[error("Oracle rate limited: {0}")]
    OracleRateLimited(String),

    /// Auth, network or provider failure. Aborts the whole request.
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the caller can reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::OracleRateLimited(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
