//! Ports - Interfaces between the domain and infrastructure.

mod decision_trace_sink;

pub use decision_trace_sink::DecisionTraceSink;
