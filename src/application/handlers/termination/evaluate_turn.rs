//! EvaluateTurnHandler - Runs the termination policy for one exchange.
//!
//! Wires the engine to a trace sink and applies the caller-side error
//! policy: an engine failure never ends a conversation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::conversation::{ConversationContext, ConversationState};
use crate::domain::termination::{Decision, TerminationEngine, TerminationError, TraceRecord};
use crate::ports::DecisionTraceSink;

/// Which decision pathway to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pathway {
    /// State-aware suggest/confirm protocol with the mutual-intent fast path.
    #[default]
    TwoPhase,
    /// Stateless single-shot check.
    Legacy,
}

/// Command to evaluate the latest exchange.
#[derive(Debug, Clone, Default)]
pub struct EvaluateTurnCommand {
    pub latest_assistant_text: String,
    pub latest_student_text: Option<String>,
    pub pathway: Pathway,
    /// Caller context copied into the trace record.
    pub extra: Option<serde_json::Value>,
}

impl EvaluateTurnCommand {
    pub fn new(assistant_text: impl Into<String>, student_text: Option<String>) -> Self {
        Self {
            latest_assistant_text: assistant_text.into(),
            latest_student_text: student_text,
            ..Self::default()
        }
    }

    pub fn legacy(mut self) -> Self {
        self.pathway = Pathway::Legacy;
        self
    }

    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = Some(extra);
        self
    }
}

/// Result of evaluating one exchange.
#[derive(Debug, Clone)]
pub struct EvaluateTurnResult {
    pub decision: Decision,
    pub trace: TraceRecord,
}

/// Handler for evaluating an exchange against the termination policy.
pub struct EvaluateTurnHandler {
    engine: Arc<TerminationEngine>,
    trace_sink: Arc<dyn DecisionTraceSink>,
}

impl EvaluateTurnHandler {
    pub fn new(engine: Arc<TerminationEngine>, trace_sink: Arc<dyn DecisionTraceSink>) -> Self {
        Self { engine, trace_sink }
    }

    pub fn handle(
        &self,
        context: &mut ConversationContext,
        cmd: EvaluateTurnCommand,
    ) -> EvaluateTurnResult {
        let state_before = context.state();
        let student_text = cmd.latest_student_text.as_deref();

        // 1. Run the requested pathway
        let outcome = match cmd.pathway {
            Pathway::TwoPhase => {
                self.engine
                    .evaluate(context, &cmd.latest_assistant_text, student_text)
            }
            Pathway::Legacy => {
                self.engine
                    .evaluate_legacy(context, &cmd.latest_assistant_text, student_text)
            }
        };

        // 2. Fail open on engine errors
        let decision = fail_open(outcome, context, state_before);

        // 3. Record the decision
        let trace = self.engine.trace(context, &decision, cmd.extra);
        self.trace_sink.record(&trace);

        EvaluateTurnResult { decision, trace }
    }
}

fn fail_open(
    outcome: Result<Decision, TerminationError>,
    context: &ConversationContext,
    state_before: ConversationState,
) -> Decision {
    match outcome {
        Ok(decision) => decision,
        Err(err) => {
            warn!(
                error = %err,
                code = %err.code(),
                turn_count = context.turn_count(),
                "Termination engine failed, continuing conversation"
            );
            Decision::fail_open(state_before, err.to_string())
        }
    }
}
