//! Unified error types for groupex.
//!
//! This module provides a single [`GroupexError`] enum that covers every
//! failure that can surface from the I/O boundaries of the crate: reading a
//! message-source snapshot, writing an export and validating configuration.
//!
//! The enrichment core itself never fails. Malformed ids, unknown senders,
//! invalid timestamps and identity conflicts are all handled with fallback
//! values, so nothing in [`crate::core`] returns this type.

use std::io;

use thiserror::Error;

/// A specialized [`Result`] type for groupex operations.
///
/// # Example
///
/// ```rust
/// use groupex::error::Result;
/// use groupex::Identity;
///
/// fn my_function() -> Result<Vec<Identity>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, GroupexError>;

/// The error type for all fallible groupex operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GroupexError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The snapshot file doesn't exist
    /// - Permission denied
    /// - The export directory cannot be created
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing/serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The input doesn't match the expected structure.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was expected
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// No group name contains the requested text.
    #[error("Group not found: no group name contains '{query}'")]
    GroupNotFound {
        /// The substring that was searched for
        query: String,
    },

    /// A date window bound could not be parsed.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The invalid date string that was provided
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// A configuration value failed its existence check.
    #[error("Invalid configuration for '{field}': {message}")]
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error in {context}: {source}")]
    Utf8 {
        /// Description of where the error occurred
        context: String,
        /// The underlying UTF-8 error
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl From<std::string::FromUtf8Error> for GroupexError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        GroupexError::Utf8 {
            context: "output conversion".to_string(),
            source: err,
        }
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl GroupexError {
    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        GroupexError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Creates a group-not-found error.
    pub fn group_not_found(query: impl Into<String>) -> Self {
        GroupexError::GroupNotFound {
            query: query.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        GroupexError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        GroupexError::InvalidConfig {
            field,
            message: message.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, GroupexError::Io(_))
    }

    /// Returns `true` if this is a JSON error.
    pub fn is_json(&self) -> bool {
        matches!(self, GroupexError::Json(_))
    }

    /// Returns `true` if this is an invalid format error.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, GroupexError::InvalidFormat { .. })
    }

    /// Returns `true` if the requested group could not be located.
    pub fn is_group_not_found(&self) -> bool {
        matches!(self, GroupexError::GroupNotFound { .. })
    }

    /// Returns `true` if this is a date-related error.
    pub fn is_invalid_date(&self) -> bool {
        matches!(self, GroupexError::InvalidDate { .. })
    }

    /// Returns `true` if this is a configuration error.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, GroupexError::InvalidConfig { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
