//! Decision trace sinks.

mod in_memory;
mod tracing_sink;

pub use in_memory::InMemoryTraceSink;
pub use tracing_sink::TracingTraceSink;
