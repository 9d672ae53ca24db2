//! Error types for remote mutations.

use rfe_core::RemoteError;
use thiserror::Error;

/// Errors produced by an orchestrated remote mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpsError {
    /// The remote call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The target of a move or paste is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    /// A new name was empty.
    #[error("Name cannot be empty")]
    EmptyName,

    /// One upload in a queue failed; the rest were not attempted.
    #[error("Upload of {name} failed: {error}")]
    Upload { name: String, error: RemoteError },
}

impl OpsError {
    /// Text shown to the user in a toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote(err) => err.user_message(),
            Self::Upload { name, error } => format!("{name}: {}", error.user_message()),
            other => other.to_string(),
        }
    }
}

/// Result alias for orchestrated mutations.
pub type OpsResult<T> = Result<T, OpsError>;
