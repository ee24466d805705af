//! Audit records for termination decisions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coverage::CoverageMap;
use super::decision::Decision;
use crate::domain::conversation::{
    ConversationContext, ConversationState, IntentFlags, TerminationTrigger,
};
use crate::domain::foundation::Timestamp;

/// Thresholds in force when a decision was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub turn_floor: u32,
    pub end_token: String,
}

/// Immutable, timestamped record of one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub trace_id: Uuid,
    pub recorded_at: Timestamp,
    pub turn_count: u32,
    pub coverage: CoverageMap,
    pub thresholds: Thresholds,
    pub state: ConversationState,
    pub flags: IntentFlags,
    pub termination_trigger: Option<TerminationTrigger>,
    pub decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl TraceRecord {
    /// Captures the context as it stands after the decision.
    pub fn new(
        context: &ConversationContext,
        coverage: CoverageMap,
        thresholds: Thresholds,
        decision: Decision,
        extra: Option<serde_json::Value>,
    ) -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            recorded_at: Timestamp::now(),
            turn_count: context.turn_count(),
            coverage,
            thresholds,
            state: context.state(),
            flags: context.flags(),
            termination_trigger: context.termination_trigger(),
            decision,
            extra,
        }
    }

    /// JSON form for log shipping. Falls back to `null` rather than failing.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
