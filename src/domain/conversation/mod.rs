//! Conversation domain module.
//!
//! The transcript, the caller-owned context and the lifecycle state
//! the termination engine reads and writes.

mod context;
mod state;
mod turn;

pub use context::{
    ConversationContext, IntentFlags, PersistedContext, StateRecovery, TerminationTrigger,
};
pub use state::ConversationState;
pub use turn::{Speaker, Turn};
