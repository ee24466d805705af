//! Trace sink that emits records through `tracing`.

use tracing::info;

use crate::domain::termination::TraceRecord;
use crate::ports::DecisionTraceSink;

/// Logs each record as a structured `info!` event under the
/// `termination_trace` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTraceSink;

impl TracingTraceSink {
    pub fn new() -> Self {
        Self
    }
}

impl DecisionTraceSink for TracingTraceSink {
    fn record(&self, record: &TraceRecord) {
        info!(
            target: "termination_trace",
            trace_id = %record.trace_id,
            turn_count = record.turn_count,
            state = %record.state,
            should_continue = record.decision.should_continue,
            reason = %record.decision.reason,
            record = %record.to_json(),
            "Termination decision recorded"
        );
    }
}
