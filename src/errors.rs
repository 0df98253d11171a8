use std::result::Result as StdResult;

use thiserror::Error;

use crate::domain::RecordId;

/// Error type for the storage, configuration and validation layers.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{kind} {id} not found.")]
    NotFound { kind: &'static str, id: RecordId },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, AssetError>;
