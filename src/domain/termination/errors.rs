//! Errors raised by the termination engine and its detectors.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};

/// Programmer and configuration errors.
///
/// Degenerate input (empty text, missing student reply) is never an error;
/// it resolves to "no signal".
#[derive(Debug, Error)]
pub enum TerminationError {
    #[error("Unknown coverage category '{name}'")]
    InvalidCategory { name: String },

    #[error("Unknown conversation state '{value}'")]
    UnknownState { value: String },

    #[error("Invalid state transition: {0}")]
    InvalidTransition(#[from] ValidationError),

    #[error("Pattern set '{set}' contains an invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        set: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Cannot load pattern overrides from {path}: {reason}")]
    PatternFile { path: PathBuf, reason: String },
}

impl TerminationError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidCategory { .. } => ErrorCode::InvalidCategory,
            Self::UnknownState { .. } => ErrorCode::UnknownState,
            Self::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
            Self::InvalidPattern { .. } => ErrorCode::InvalidPattern,
            Self::PatternFile { .. } => ErrorCode::PatternFileUnreadable,
        }
    }

    pub(crate) fn invalid_category(name: impl Into<String>) -> Self {
        Self::InvalidCategory { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_category_names_the_category() {
        let err = TerminationError::invalid_category("empathy");
        assert_eq!(err.to_string(), "Unknown coverage category 'empathy'");
        assert_eq!(err.code(), ErrorCode::InvalidCategory);
    }

    #[test]
    fn transition_errors_convert_from_validation_errors() {
        let err: TerminationError =
            ValidationError::invalid_format("state_transition", "Ended -> Active").into();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }
}
