//! Conversation state machine.
//!
//! The structured ending pathway moves a conversation from `Active` through
//! an optional `EndSuggested` checkpoint to the terminal `Ended` state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;
use crate::domain::termination::TerminationError;

/// The lifecycle state of a practice conversation.
///
/// - `Active`: dialogue in progress, ending not yet proposed
/// - `EndSuggested`: the assistant proposed ending, awaiting the student's answer
/// - `Ended`: terminal, the conversation may not continue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Active,
    EndSuggested,
    Ended,
}

impl ConversationState {
    /// Returns the persisted string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::EndSuggested => "end_suggested",
            Self::Ended => "ended",
        }
    }

    /// Returns true while the ending proposal is awaiting an answer.
    pub fn is_pending_confirmation(&self) -> bool {
        matches!(self, Self::EndSuggested)
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationState {
    type Err = TerminationError;

    /// Parses the persisted form. Accepts either case (`ended`, `ENDED`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "end_suggested" => Ok(Self::EndSuggested),
            "ended" => Ok(Self::Ended),
            _ => Err(TerminationError::UnknownState {
                value: s.to_string(),
            }),
        }
    }
}

impl StateMachine for ConversationState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationState::*;
        matches!(
            (self, target),
            // Coverage and turn floor satisfied, ending proposed
            (Active, EndSuggested) |
            // Mutual-intent fast path skips the proposal
            (Active, Ended) |
            // Student did not confirm, conversation resumes
            (EndSuggested, Active) |
            // Student confirmed, or mutual intent observed while pending
            (EndSuggested, Ended)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationState::*;
        match self {
            Active => vec![EndSuggested, Ended],
            EndSuggested => vec![Active, Ended],
            Ended => vec![],
        }
    }
}
