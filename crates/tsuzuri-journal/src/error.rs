//! Error types for journal operations.

use thiserror::Error;
use tsuzuri_doc::DocError;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("document error: {0}")]
    Doc(#[from] DocError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for journal operations.
pub type JournalResult<T> = Result<T, JournalError>;
