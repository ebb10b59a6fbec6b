//! Error types for the cinelog library.
//!
//! Most failures in the pipeline are non-fatal (a failed
//! lookup marks a record for review instead of aborting the run); the
//! variants here cover the cases that must stop a run before it mutates
//! the catalog file.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cinelog operations.
#[derive(Debug, Error)]
pub enum CinelogError {
    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Credential errors
    #[error("API key unavailable: {message}")]
    MissingCredentials { message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for cinelog operations.
pub type Result<T> = std::result::Result<T, CinelogError>;

// Conversion implementations for common error types

impl From<std::io::Error> for CinelogError {
    fn from(err: std::io::Error) -> Self {
        CinelogError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for CinelogError {
    fn from(err: serde_json::Error) -> Self {
        CinelogError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for CinelogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CinelogError::Timeout(crate::config::NetworkConfig::REQUEST_TIMEOUT)
        } else {
            CinelogError::Network {
                message: err.to_string(),
                source: Some(err),
            }
        }
    }
}

impl CinelogError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        CinelogError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Whether this error must abort the run before any file mutation.
    ///
    /// Lookup failures are handled inline (record marked for review);
    /// missing credentials and a missing catalog file are not.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CinelogError::MissingCredentials { .. }
                | CinelogError::FileNotFound(_)
                | CinelogError::Config { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CinelogError::FileNotFound(PathBuf::from("catalog.org"));
        assert_eq!(err.to_string(), "File not found: catalog.org");
    }

    #[test]
    fn test_fatal_errors() {
        assert!(CinelogError::MissingCredentials {
            message: "pass exited with status 1".into()
        }
        .is_fatal());
        assert!(CinelogError::FileNotFound(PathBuf::from("x.org")).is_fatal());
        assert!(!CinelogError::Network {
            message: "connection reset".into(),
            source: None
        }
        .is_fatal());
    }
}
