//! Caller-owned conversation context.
//!
//! Holds the transcript, the student turn counter and the flags the
//! termination engine persists between calls. Callers append turns; only
//! the engine writes the state, the flags and the termination trigger.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::state::ConversationState;
use super::turn::{Speaker, Turn};
use crate::domain::termination::TerminationError;

/// Why a conversation ended, for downstream reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationTrigger {
    /// Turn floor and technique coverage met, ending confirmed by the student.
    MiComplete,
    /// Both sides signalled they were done.
    MutualIntent,
    /// Ended, but the cause was not recorded (restored from older storage).
    Unknown,
}

/// Flags persisted across turns.
///
/// `initiator_end_intent` and `counterpart_end_ack` only ever flip from
/// false to true within one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntentFlags {
    pub confirmation_flag: bool,
    pub initiator_end_intent: bool,
    pub counterpart_end_ack: bool,
}

impl IntentFlags {
    /// Both sides of the closure pair have been observed.
    pub fn mutual_intent(&self) -> bool {
        self.initiator_end_intent && self.counterpart_end_ack
    }
}

/// How to treat an unrecognized persisted state string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateRecovery {
    /// Reject with `TerminationError::UnknownState`.
    #[default]
    Strict,
    /// Log a warning and fall back to `Active`.
    Lenient,
}

/// Mutable per-conversation state supplied by the caller on every call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConversationContext {
    history: Vec<Turn>,
    turn_count: u32,
    state: ConversationState,
    flags: IntentFlags,
    termination_trigger: Option<TerminationTrigger>,
}

impl ConversationContext {
    /// Creates a fresh context for a new conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from an existing transcript.
    ///
    /// `turn_count` is the number of student turns in `history`.
    pub fn from_history(history: Vec<Turn>) -> Self {
        let turn_count = count_student_turns(&history);
        Self {
            history,
            turn_count,
            ..Self::default()
        }
    }

    /// Appends a turn. Student turns advance the turn counter.
    pub fn record_turn(&mut self, speaker: Speaker, text: impl Into<String>) {
        if speaker == Speaker::Student {
            self.turn_count = self.turn_count.saturating_add(1);
        }
        self.history.push(Turn::new(speaker, text));
    }

    /// Reinitializes every field for a new conversation.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn flags(&self) -> IntentFlags {
        self.flags
    }

    pub fn confirmation_flag(&self) -> bool {
        self.flags.confirmation_flag
    }

    pub fn initiator_end_intent(&self) -> bool {
        self.flags.initiator_end_intent
    }

    pub fn counterpart_end_ack(&self) -> bool {
        self.flags.counterpart_end_ack
    }

    pub fn termination_trigger(&self) -> Option<TerminationTrigger> {
        self.termination_trigger
    }

    /// Returns the most recent turn written by `speaker`.
    pub fn last_turn_by(&self, speaker: Speaker) -> Option<&Turn> {
        self.history.iter().rev().find(|t| t.speaker == speaker)
    }

    /// Owned copy for the stateless legacy pathway.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Converts into the storage shape.
    pub fn persist(&self) -> PersistedContext {
        PersistedContext {
            history: self.history.clone(),
            turn_count: self.turn_count,
            state: self.state.as_str().to_string(),
            confirmation_flag: self.flags.confirmation_flag,
            initiator_end_intent: self.flags.initiator_end_intent,
            counterpart_end_ack: self.flags.counterpart_end_ack,
            termination_trigger: self.termination_trigger,
        }
    }

    /// Rehydrates a context loaded from session storage.
    pub fn restore(
        persisted: PersistedContext,
        recovery: StateRecovery,
    ) -> Result<Self, TerminationError> {
        let state = match persisted.state.parse::<ConversationState>() {
            Ok(state) => state,
            Err(_) if recovery == StateRecovery::Lenient => {
                warn!(
                    persisted_state = %persisted.state,
                    "Unrecognized conversation state, recovering as active"
                );
                ConversationState::Active
            }
            Err(err) => return Err(err),
        };

        let termination_trigger = match (state, persisted.termination_trigger) {
            (ConversationState::Ended, None) => Some(TerminationTrigger::Unknown),
            (ConversationState::Ended, trigger) => trigger,
            _ => None,
        };

        Ok(Self {
            history: persisted.history,
            turn_count: persisted.turn_count,
            state,
            flags: IntentFlags {
                confirmation_flag: persisted.confirmation_flag && state.is_pending_confirmation(),
                initiator_end_intent: persisted.initiator_end_intent,
                counterpart_end_ack: persisted.counterpart_end_ack,
            },
            termination_trigger,
        })
    }

    pub(crate) fn set_state(&mut self, state: ConversationState) {
        self.state = state;
        self.flags.confirmation_flag = state.is_pending_confirmation();
    }

    pub(crate) fn raise_initiator_end_intent(&mut self) {
        self.flags.initiator_end_intent = true;
    }

    pub(crate) fn raise_counterpart_end_ack(&mut self) {
        self.flags.counterpart_end_ack = true;
    }

    pub(crate) fn finish(&mut self, trigger: TerminationTrigger) {
        self.set_state(ConversationState::Ended);
        self.termination_trigger = Some(trigger);
    }
}

/// Storage shape of a conversation context.
///
/// `history`, `turn_count` and `state` are required; a record missing any of
/// them fails to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedContext {
    pub history: Vec<Turn>,
    pub turn_count: u32,
    pub state: String,
    #[serde(default)]
    pub confirmation_flag: bool,
    #[serde(default)]
    pub initiator_end_intent: bool,
    #[serde(default)]
    pub counterpart_end_ack: bool,
    #[serde(default)]
    pub termination_trigger: Option<TerminationTrigger>,
}

fn count_student_turns(history: &[Turn]) -> u32 {
    let count = history
        .iter()
        .filter(|t| t.speaker == Speaker::Student)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
