use std::fmt;

use thiserror::Error;

use crate::{domain::RecordId, errors::AssetError};

/// The remote call a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOp {
    Create,
    Edit,
    Delete,
    Refresh,
}

impl RemoteOp {
    fn verb(&self) -> &'static str {
        match self {
            RemoteOp::Create => "create",
            RemoteOp::Edit => "update",
            RemoteOp::Delete => "delete",
            RemoteOp::Refresh => "load",
        }
    }
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Rejection returned by a remote collaborator. An empty message is allowed; the
/// controller replaces it with a kind-specific phrase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
    message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AssetError> for RemoteError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::InvalidInput(message) => RemoteError::new(message),
            other => RemoteError::new(other.to_string()),
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failures the controller reports through its error slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("{message}")]
    Remote { op: RemoteOp, message: String },
    #[error("This {kind} no longer exists. Reopen the editor and try again.")]
    StaleRecord { kind: &'static str, id: RecordId },
}

impl SyncError {
    /// Passes the collaborator's message through, or falls back to a phrase naming
    /// the operation and record kind when it has nothing to say.
    pub fn remote(op: RemoteOp, kind_label: &str, err: RemoteError) -> Self {
        let trimmed = err.message().trim();
        let message = if trimmed.is_empty() {
            format!("Failed to {} {}.", op.verb(), kind_label)
        } else {
            trimmed.to_string()
        };
        SyncError::Remote { op, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_remote_message_uses_fallback() {
        let err = SyncError::remote(RemoteOp::Delete, "holding", RemoteError::new("  "));
        assert_eq!(err.to_string(), "Failed to delete holding.");
    }

    #[test]
    fn remote_message_is_passed_through() {
        let err = SyncError::remote(RemoteOp::Create, "holding", RemoteError::new("network error"));
        assert_eq!(err.to_string(), "network error");
    }

    #[test]
    fn store_validation_errors_keep_their_message() {
        let err: RemoteError = AssetError::InvalidInput("name cannot be empty.".into()).into();
        assert_eq!(err.message(), "name cannot be empty.");
    }
}
