//! DecisionTraceSink port - Where termination audit records go.
//!
//! The engine builds records; sinks ship them to logging infrastructure.

use crate::domain::termination::TraceRecord;

/// Port for recording termination decisions.
///
/// Implementations must not fail or panic: observability problems must
/// never change a conversation's outcome.
pub trait DecisionTraceSink: Send + Sync {
    /// Records one decision.
    fn record(&self, record: &TraceRecord);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn DecisionTraceSink) {}
}
