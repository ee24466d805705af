//! Adapters - Implementations of the port interfaces.

pub mod trace;

pub use trace::{InMemoryTraceSink, TracingTraceSink};
