//! Error types for indexer-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from indexer-core
    #[error(transparent)]
    Core(#[from] indexer_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error("Cannot render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_display_transparently() {
        let err: CliError = indexer_core::Error::connection("no servers available").into();

        assert_eq!(err.to_string(), "Connection error: no servers available");
    }

    #[test]
    fn test_user_error_display() {
        assert_eq!(
            CliError::user("2 index operation(s) failed").to_string(),
            "2 index operation(s) failed"
        );
    }
}
