//! Domain layer containing the termination policy and its vocabulary.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (timestamps, errors, state machine trait)
//! - `conversation` - Turns, conversation state and the caller-owned context
//! - `termination` - Signal detectors, coverage aggregation, the decision engine and traces

pub mod conversation;
pub mod foundation;
pub mod termination;
