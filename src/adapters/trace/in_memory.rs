//! In-memory trace sink for tests and transcript replay.

use std::sync::{Mutex, MutexGuard};

use crate::domain::termination::TraceRecord;
use crate::ports::DecisionTraceSink;

/// Collects records in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryTraceSink {
    records: Mutex<Vec<TraceRecord>>,
}

impl InMemoryTraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of all records so far.
    pub fn records(&self) -> Vec<TraceRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes and returns all records.
    pub fn drain(&self) -> Vec<TraceRecord> {
        std::mem::take(&mut *self.lock())
    }

    // A poisoned lock still holds valid records; keep recording.
    fn lock(&self) -> MutexGuard<'_, Vec<TraceRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DecisionTraceSink for InMemoryTraceSink {
    fn record(&self, record: &TraceRecord) {
        self.lock().push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::ConversationContext;
    use crate::domain::termination::TerminationEngine;

    #[test]
    fn keeps_records_in_order_and_drains() {
        let engine = TerminationEngine::default();
        let sink = InMemoryTraceSink::new();
        let mut ctx = ConversationContext::new();

        for text in ["first", "second"] {
            let decision = engine.evaluate(&mut ctx, text, None).unwrap();
            sink.record(&engine.trace(&ctx, &decision, Some(serde_json::json!(text))));
        }

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].extra, Some(serde_json::json!("first")));

        assert_eq!(sink.drain().len(), 2);
        assert!(sink.is_empty());
    }
}
