//! Transcript replay.
//!
//! Feeds a recorded transcript through the evaluate-turn handler as if it
//! were happening live: every assistant turn triggers one evaluation,
//! paired with the latest student reply since the previous evaluation.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::handlers::{EvaluateTurnCommand, EvaluateTurnHandler, EvaluateTurnResult, Pathway};
use crate::domain::conversation::{ConversationContext, Speaker, Turn};

/// Errors raised while loading a transcript.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("Failed to read transcript {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed transcript: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A recorded conversation, either a bare array of turns or `{"turns": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Bare(Vec<Turn>),
    Wrapped { turns: Vec<Turn> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub turns: Vec<Turn>,
}

impl Transcript {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TranscriptError> {
        let turns = match serde_json::from_str::<TranscriptFile>(raw)? {
            TranscriptFile::Bare(turns) | TranscriptFile::Wrapped { turns } => turns,
        };
        Ok(Self { turns })
    }

    pub fn from_file(path: &Path) -> Result<Self, TranscriptError> {
        let raw = std::fs::read_to_string(path).map_err(|source| TranscriptError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

/// Replays transcripts against a fresh context.
pub struct TranscriptReplayer<'a> {
    handler: &'a EvaluateTurnHandler,
    pathway: Pathway,
}

impl<'a> TranscriptReplayer<'a> {
    pub fn new(handler: &'a EvaluateTurnHandler, pathway: Pathway) -> Self {
        Self { handler, pathway }
    }

    /// Runs the transcript and returns one result per evaluation.
    ///
    /// Stops at the first decision that ends the conversation; later turns
    /// are not recorded.
    pub fn replay(
        &self,
        transcript: &Transcript,
    ) -> (ConversationContext, Vec<EvaluateTurnResult>) {
        let mut context = ConversationContext::new();
        let mut pending_reply: Option<String> = None;
        let mut results = Vec::new();

        for (index, turn) in transcript.turns.iter().enumerate() {
            context.record_turn(turn.speaker, turn.text.clone());

            match turn.speaker {
                Speaker::Student => pending_reply = Some(turn.text.clone()),
                Speaker::Assistant => {
                    let mut cmd = EvaluateTurnCommand::new(turn.text.clone(), pending_reply.take())
                        .with_extra(serde_json::json!({ "turn_index": index }));
                    cmd.pathway = self.pathway;

                    let result = self.handler.handle(&mut context, cmd);
                    let ended = !result.decision.should_continue;
                    results.push(result);
                    if ended {
                        debug!(turn_index = index, "Replay stopped, conversation ended");
                        break;
                    }
                }
            }
        }

        (context, results)
    }
}
