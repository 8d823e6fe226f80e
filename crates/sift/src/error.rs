//! Error types for the sift crate.
//!
//! The query pipeline itself never fails. These errors come only from the
//! strict constructors callers may use to validate input up front.

use thiserror::Error;

/// Errors reported by strict validation helpers.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Cursor token could not be decoded.
    #[error("invalid cursor token: {reason}")]
    InvalidCursor { reason: String },

    /// Engine configuration could not be parsed as YAML.
    #[error("invalid engine config: {0}")]
    ConfigYaml(#[from] serde_yaml::Error),

    /// Engine configuration could not be parsed as JSON.
    #[error("invalid engine config: {0}")]
    ConfigJson(#[from] serde_json::Error),
}

impl QueryError {
    pub(crate) fn invalid_cursor(reason: impl Into<String>) -> Self {
        QueryError::InvalidCursor {
            reason: reason.into(),
        }
    }
}

/// Result type for sift operations.
pub type Result<T> = std::result::Result<T, QueryError>;
