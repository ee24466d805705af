//! Chat turns exchanged between the simulated patient and the student.

use serde::{Deserialize, Serialize};

/// Author of a turn.
///
/// The assistant plays the simulated patient and opens the conversation;
/// the student is the practitioner being trained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    #[serde(alias = "initiator")]
    Assistant,
    #[serde(alias = "counterpart")]
    Student,
}

/// A single immutable chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    /// Creates a new turn.
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }

    /// Shorthand for an assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text)
    }

    /// Shorthand for a student turn.
    pub fn student(text: impl Into<String>) -> Self {
        Self::new(Speaker::Student, text)
    }
}
