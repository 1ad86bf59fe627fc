//! Errors surfaced by the sync layer.

use thiserror::Error;

use crate::actor::ActorError;

/// Sync layer error type.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No actor or no caller identity; the call was never attempted.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The actor connection has not been established.
    #[error("Actor not available")]
    ActorUnavailable,

    /// The actor call itself failed.
    #[error("{operation} failed: {source}")]
    Remote {
        operation: &'static str,
        #[source]
        source: ActorError,
    },
}

impl SyncError {
    /// Message to show the user, using `fallback` when the remote error has
    /// no message of its own.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Remote { source, .. } => source.message().unwrap_or(fallback).to_string(),
            Self::Unauthenticated | Self::ActorUnavailable => self.to_string(),
        }
    }

    /// True when the failure happened before any actor call.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::ActorUnavailable)
    }
}

/// Result type alias for `SyncError`.
pub type Result<T> = std::result::Result<T, SyncError>;
