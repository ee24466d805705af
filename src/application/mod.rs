//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;
pub mod replay;

pub use handlers::{EvaluateTurnCommand, EvaluateTurnHandler, EvaluateTurnResult, Pathway};
pub use replay::{Transcript, TranscriptError, TranscriptReplayer};
