//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod termination;

pub use termination::{EvaluateTurnCommand, EvaluateTurnHandler, EvaluateTurnResult, Pathway};
