//! Error types for remote calls.

use thiserror::Error;

/// Errors that can occur while talking to the remote file service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The request never produced a response (connection, TLS, timeout).
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The response body could not be decoded.
    #[error("Invalid response: {message}")]
    Decode { message: String },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: String },

    /// The server refused the operation.
    #[error("{message}")]
    Rejected { message: String },
}

impl RemoteError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a rejection with a server-provided reason.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Build an error from an HTTP status and optional `detail` field.
    pub fn http(status: u16, detail: Option<String>) -> Self {
        let detail = detail.unwrap_or_else(|| "Unknown error".to_string());
        if status == 404 {
            return Self::NotFound { path: detail };
        }
        Self::Http { status, detail }
    }

    /// Text shown to the user in a toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { detail, .. } => detail.clone(),
            Self::Transport { message } | Self::Decode { message } | Self::Rejected { message } => {
                message.clone()
            }
            Self::NotFound { path } => format!("Not found: {path}"),
        }
    }
}

/// Result alias for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_404_maps_to_not_found() {
        let err = RemoteError::http(404, Some("Directory not found".into()));
        assert!(matches!(err, RemoteError::NotFound { .. }));
    }

    #[test]
    fn test_user_message_prefers_detail() {
        let err = RemoteError::http(403, Some("Path not allowed".into()));
        assert_eq!(err.user_message(), "Path not allowed");
        assert_eq!(err.to_string(), "HTTP 403: Path not allowed");

        let err = RemoteError::http(500, None);
        assert_eq!(err.user_message(), "Unknown error");
    }
}
