//! Decision returned for every evaluated turn.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::coverage::CoverageCategory;
use crate::domain::conversation::ConversationState;

/// Why the engine decided to continue or end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DecisionReason {
    /// Fewer student turns than the configured floor.
    TurnFloorNotMet { turn_count: u32, floor: u32 },
    /// One or more techniques not yet observed.
    CoverageIncomplete { missing: Vec<CoverageCategory> },
    /// No explicit closing request from the student.
    ConfirmationMissing,
    /// The student's reply was only a filler acknowledgement.
    ConfirmationAmbiguous,
    /// The assistant's latest turn lacks the end marker.
    EndTokenMissing,
    /// Floor and coverage met; the assistant should propose ending.
    EndSuggested,
    /// Ending proposed, student reply not yet available.
    AwaitingConfirmation,
    /// Ending proposed, student reply did not confirm.
    SuggestionDeclined,
    /// Ending proposed and confirmed.
    ConfirmationReceived,
    /// Both sides signalled they were done.
    MutualIntent,
    /// Every legacy condition passed.
    AllConditionsMet,
    /// The conversation had already ended.
    AlreadyEnded,
    /// The engine failed; the caller keeps the conversation open.
    EngineError { message: String },
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TurnFloorNotMet { turn_count, floor } => {
                write!(f, "turn floor not met ({turn_count} of {floor} student turns)")
            }
            Self::CoverageIncomplete { missing } => {
                let names: Vec<&str> = missing.iter().map(|c| c.as_str()).collect();
                write!(f, "technique coverage incomplete: missing {}", names.join(", "))
            }
            Self::ConfirmationMissing => f.write_str("student has not confirmed ending"),
            Self::ConfirmationAmbiguous => {
                f.write_str("student reply is an ambiguous acknowledgement, not a confirmation")
            }
            Self::EndTokenMissing => f.write_str("end token missing from assistant message"),
            Self::EndSuggested => f.write_str("requirements met, suggesting the conversation end"),
            Self::AwaitingConfirmation => {
                f.write_str("awaiting student reply to ending suggestion")
            }
            Self::SuggestionDeclined => {
                f.write_str("student did not confirm ending, conversation resumes")
            }
            Self::ConfirmationReceived => f.write_str("student confirmed ending"),
            Self::MutualIntent => f.write_str("both participants signalled closure"),
            Self::AllConditionsMet => f.write_str("all ending conditions met"),
            Self::AlreadyEnded => f.write_str("conversation already ended"),
            Self::EngineError { message } => write!(f, "engine error, continuing: {message}"),
        }
    }
}

/// Continue/end verdict for one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(rename = "continue")]
    pub should_continue: bool,
    pub state: ConversationState,
    pub reason: DecisionReason,
    pub suggest_ending: bool,
    pub mutual_intent: bool,
}

impl Decision {
    /// Keep the conversation going.
    pub fn proceed(state: ConversationState, reason: DecisionReason) -> Self {
        Self {
            should_continue: true,
            state,
            reason,
            suggest_ending: false,
            mutual_intent: false,
        }
    }

    /// Stop the conversation.
    pub fn end(reason: DecisionReason) -> Self {
        Self {
            should_continue: false,
            state: ConversationState::Ended,
            reason,
            suggest_ending: false,
            mutual_intent: false,
        }
    }

    /// Keep going and ask the assistant to propose ending on this turn.
    pub fn suggest() -> Self {
        Self {
            suggest_ending: true,
            ..Self::proceed(ConversationState::EndSuggested, DecisionReason::EndSuggested)
        }
    }

    /// Stop because both participants signalled closure.
    pub fn mutual_intent() -> Self {
        Self {
            mutual_intent: true,
            ..Self::end(DecisionReason::MutualIntent)
        }
    }

    /// Continue after an engine failure. Never ends the conversation.
    pub fn fail_open(state: ConversationState, message: impl Into<String>) -> Self {
        Self::proceed(
            state,
            DecisionReason::EngineError {
                message: message.into(),
            },
        )
    }

    /// Human-readable reason.
    pub fn reason_text(&self) -> String {
        self.reason.to_string()
    }
}
