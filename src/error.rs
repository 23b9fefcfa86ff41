//! Error taxonomy for the pipeline.
//!
//! Only [`PipelineError`] terminates a run. Source and per-batch store
//! failures are recovered where they happen and recorded in stage reports.

use thiserror::Error;

/// Failure of a single source adapter call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
    /// Network failure, timeout or non-success HTTP status.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// Payload could not be interpreted (bad JSON, missing CSV columns, ...).
    #[error("parse error: {0}")]
    Parse(String),
}

impl SourceError {
    /// Only transport failures are worth retrying against the same source.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Unavailable(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Unavailable(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("connection error: {0}")]
    Connection(String),

    /// The store refused the write (constraint violation, injected failure, ...).
    #[error("write rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("required configuration {0} is not set")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Errors that abort a run before or during a stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no countries resolved from the reference table")]
    NoCountries,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
