//! Error types shared across the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors raised while validating values and state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Stable error codes for diagnostics and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidCategory,
    UnknownState,
    InvalidStateTransition,
    InvalidPattern,
    PatternFileUnreadable,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidCategory => "INVALID_CATEGORY",
            ErrorCode::UnknownState => "UNKNOWN_STATE",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::InvalidPattern => "INVALID_PATTERN",
            ErrorCode::PatternFileUnreadable => "PATTERN_FILE_UNREADABLE",
        };
        write!(f, "{}", s)
    }
}
