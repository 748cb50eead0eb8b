//! Error types for specifications and runtime clients.

use thiserror::Error;

/// A specification is missing a required field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `name` is absent, empty, or not a string.
    #[error("a name is required")]
    MissingName,

    /// `Image` is absent, empty, or not a string.
    #[error("an Image is required")]
    MissingImage,
}

/// Errors reported by a container runtime client.
///
/// `NotFound` and `Conflict` are expected outcomes that callers in this
/// crate turn into booleans; everything else propagates.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The named container or image does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A container with the same name already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The runtime rejected the request.
    #[error("runtime error {status}: {message}")]
    Api { status: u16, message: String },

    /// Any other client failure (unreachable daemon, bad response, failed pull).
    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl RuntimeError {
    /// Create an API error from response details.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Wrap a client-specific failure.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Box::new(err))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
