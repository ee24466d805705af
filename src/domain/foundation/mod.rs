//! Foundation module - Shared domain primitives.
//!
//! Contains the value objects, error vocabulary and state machine trait
//! used by the conversation and termination modules.

mod errors;
mod state_machine;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
