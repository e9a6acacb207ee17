//! Error types for the synchronization layer

use thiserror::Error;

/// Result type for synchronization operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while ordering, mutating or synchronizing entities
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// Malformed intent or unsupported request
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Actor lacks access to the board, column or card
    #[error("actor '{actor}' is not allowed to {action}")]
    Authorization { actor: String, action: String },

    /// Target or parent no longer exists
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Order keys could not be resolved into a strict order
    #[error("order key conflict: {message}")]
    Conflict { message: String },

    /// Realtime bus unreachable
    #[error("realtime transport error: {message}")]
    Transport { message: String },

    /// JSON (de)serialization error
    #[error("JSON error: {message}")]
    Json { message: String },
}

impl SyncError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an authorization error
    pub fn unauthorized(actor: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Authorization {
            actor: actor.into(),
            action: action.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an order key conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Whether this error stops a mutation before anything is persisted
    pub fn aborts_commit(&self) -> bool {
        !matches!(self, Self::Transport { .. })
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Conflict { .. })
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json {
            message: error.to_string(),
        }
    }
}
