//! Error types for vidqa.

use thiserror::Error;

/// Library-level error type for vidqa operations.
#[derive(Error, Debug)]
pub enum VidqaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcript acquisition failed: {0}")]
    Acquisition(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Index backend error: {0}")]
    IndexBackend(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Model API error: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl VidqaError {
    /// Whether retrying the same call later may succeed.
    ///
    /// Only deadline expiry is treated as transient; model and backend
    /// failures are surfaced as permanent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VidqaError::Timeout { .. })
    }

    /// Whether the error originates from the storage backend.
    pub fn is_backend(&self) -> bool {
        matches!(self, VidqaError::IndexBackend(_))
    }
}

impl From<rusqlite::Error> for VidqaError {
    fn from(e: rusqlite::Error) -> Self {
        VidqaError::IndexBackend(e.to_string())
    }
}

/// Result type alias for vidqa operations.
pub type Result<T> = std::result::Result<T, VidqaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeouts_are_retryable() {
        let timeout = VidqaError::Timeout {
            operation: "embedding".to_string(),
            seconds: 30,
        };
        assert!(timeout.is_retryable());
        assert_eq!(timeout.to_string(), "embedding timed out after 30s");

        assert!(!VidqaError::Model("rate limited".to_string()).is_retryable());
        assert!(!VidqaError::Embedding("bad input".to_string()).is_retryable());
    }

    #[test]
    fn test_backend_classification() {
        assert!(VidqaError::IndexBackend("locked".to_string()).is_backend());
        assert!(!VidqaError::Acquisition("no captions".to_string()).is_backend());
    }

    #[test]
    fn test_sqlite_errors_are_backend_errors() {
        let err: VidqaError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, VidqaError::IndexBackend(_)));
        assert!(err.is_backend());
        assert!(!err.is_retryable());
    }
}
