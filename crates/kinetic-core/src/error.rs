//! Error types for Kinetic.
//!
//! Errors raised inside the search pipeline are caught at the controller boundary
//! and projected into a [`SearchFailure`] that travels with the published state.
//! Only synchronous validation (`set_filters`) and explicit reloads return them
//! directly to callers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the Kinetic library.
#[derive(Debug, Error)]
pub enum KineticError {
    // Record source errors
    #[error("Record source unavailable: {message}")]
    DataSourceUnavailable {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    // Validation errors
    #[error("Invalid filter value for {dimension}: {message}")]
    InvalidFilterValue { dimension: String, message: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Search controller has been disposed")]
    Disposed,

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Kinetic operations.
pub type Result<T> = std::result::Result<T, KineticError>;

/// Coarse error taxonomy exposed to UI layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The record fetch failed or timed out.
    DataSourceUnavailable,
    /// A filter patch named an unknown dimension or carried an unusable value.
    InvalidFilterValue,
    /// Anything else.
    Internal,
}

/// Cloneable projection of a [`KineticError`], carried in `SearchState`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<std::io::Error> for KineticError {
    fn from(err: std::io::Error) -> Self {
        KineticError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for KineticError {
    fn from(err: serde_json::Error) -> Self {
        KineticError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl KineticError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        KineticError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a data-source error from any displayable cause.
    pub fn unavailable(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        KineticError::DataSourceUnavailable {
            message: message.into(),
            cause: Some(cause.to_string()),
        }
    }

    /// Create a filter validation error.
    pub fn invalid_filter(dimension: impl Into<String>, message: impl Into<String>) -> Self {
        KineticError::InvalidFilterValue {
            dimension: dimension.into(),
            message: message.into(),
        }
    }

    /// Map this error onto the UI-facing taxonomy.
    ///
    /// IO and JSON failures can only come from loading records, so they count as
    /// the data source being unavailable.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KineticError::DataSourceUnavailable { .. }
            | KineticError::Io { .. }
            | KineticError::Json { .. } => ErrorKind::DataSourceUnavailable,

            KineticError::InvalidFilterValue { .. } => ErrorKind::InvalidFilterValue,

            KineticError::Disposed | KineticError::Other(_) => ErrorKind::Internal,
        }
    }

    /// Project into the cloneable failure carried by published state.
    pub fn to_failure(&self) -> SearchFailure {
        SearchFailure {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KineticError::invalid_filter("difficulty", "unknown level 'expert'");
        assert_eq!(
            err.to_string(),
            "Invalid filter value for difficulty: unknown level 'expert'"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            KineticError::unavailable("fetch failed", "connection reset").kind(),
            ErrorKind::DataSourceUnavailable
        );
        assert_eq!(
            KineticError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).kind(),
            ErrorKind::DataSourceUnavailable
        );
        assert_eq!(
            KineticError::invalid_filter("muscles", "blank").kind(),
            ErrorKind::InvalidFilterValue
        );
        assert_eq!(KineticError::Disposed.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_failure_projection() {
        let failure = KineticError::DataSourceUnavailable {
            message: "timed out after 15s".into(),
            cause: None,
        }
        .to_failure();
        assert_eq!(failure.kind, ErrorKind::DataSourceUnavailable);
        assert_eq!(failure.message, "Record source unavailable: timed out after 15s");
    }
}
