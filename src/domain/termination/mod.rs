//! Conversation termination policy.
//!
//! Decides whether a practice dialogue between a student and a simulated
//! patient may conclude. Detectors classify turns, the coverage aggregator
//! folds them over the transcript, and the engine applies the active
//! pathway's rule.

mod ambiguity;
mod closure;
mod coverage;
mod decision;
mod detectors;
mod engine;
mod errors;
mod patterns;
mod trace;

pub use ambiguity::{AmbiguityFilter, DEFAULT_AMBIGUOUS_PHRASES};
pub use closure::{ClosureSignalPair, ClosureSignals};
pub use coverage::{CoverageAggregator, CoverageCategory, CoverageMap, CoverageSummary};
pub use decision::{Decision, DecisionReason};
pub use detectors::{SignalDetectors, DEFAULT_END_TOKEN};
pub use engine::{PolicyConfig, TerminationEngine, DEFAULT_TURN_FLOOR};
pub use errors::TerminationError;
pub use patterns::{PatternCatalog, PatternOverrides, PatternSet};
pub use trace::{Thresholds, TraceRecord};
