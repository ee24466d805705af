//! Configuration error types

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::termination::TerminationError;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Pattern configuration failed: {0}")]
    Patterns(#[from] TerminationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("End token must not be empty")]
    EmptyEndToken,

    #[error("Patterns file not readable: {}", .0.display())]
    PatternsFileUnreadable(PathBuf),

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
