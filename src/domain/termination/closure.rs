//! Mutual-intent closure signals.
//!
//! One party signals willingness to stop (the closer), the other signals
//! that it has what it needs (the acknowledger). Two generations of pattern
//! sets express this same shape and are both kept:
//!
//! - initiator/acknowledger: student soft closing, assistant acknowledgment
//! - closure/satisfaction: invitation to end, expression of sufficiency

use serde::Serialize;

use super::ambiguity::AmbiguityFilter;
use super::patterns::{PatternCatalog, PatternSet};

/// Result of classifying one exchange with a closure pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClosureSignals {
    pub closer: bool,
    pub acknowledger: bool,
}

impl ClosureSignals {
    /// Both halves observed in this exchange.
    pub fn both(&self) -> bool {
        self.closer && self.acknowledger
    }

    /// Combines signals from several pairs.
    pub fn or(self, other: ClosureSignals) -> ClosureSignals {
        ClosureSignals {
            closer: self.closer || other.closer,
            acknowledger: self.acknowledger || other.acknowledger,
        }
    }
}

/// A closer pattern set paired with an acknowledger pattern set.
#[derive(Debug, Clone, Copy)]
pub struct ClosureSignalPair<'a> {
    closer: &'a PatternSet,
    acknowledger: &'a PatternSet,
    guard: &'a AmbiguityFilter,
    negation: Option<&'a PatternSet>,
}

impl<'a> ClosureSignalPair<'a> {
    pub fn new(
        closer: &'a PatternSet,
        acknowledger: &'a PatternSet,
        guard: &'a AmbiguityFilter,
    ) -> Self {
        Self {
            closer,
            acknowledger,
            guard,
            negation: None,
        }
    }

    /// Closer text matching `negation` ("let's not stop") never counts.
    pub fn with_negation(mut self, negation: &'a PatternSet) -> Self {
        self.negation = Some(negation);
        self
    }

    /// Soft closing by the student, closing acknowledgment by the assistant.
    pub fn initiator_acknowledger(catalog: &'a PatternCatalog) -> Self {
        Self::new(
            catalog.soft_closing(),
            catalog.closing_acknowledgment(),
            catalog.ambiguity(),
        )
        .with_negation(catalog.negated_closing())
    }

    /// Open invitation to end, answered by an expression of sufficiency.
    pub fn closure_satisfaction(catalog: &'a PatternCatalog) -> Self {
        Self::new(
            catalog.closure_invitation(),
            catalog.satisfaction(),
            catalog.ambiguity(),
        )
        .with_negation(catalog.negated_closing())
    }

    /// Closer half. Filler acknowledgements and negated closings never count.
    pub fn closer_signal(&self, text: &str) -> bool {
        !self.guard.is_ambiguous(text)
            && !self.negation.is_some_and(|set| set.is_match(text))
            && self.closer.is_match(text)
    }

    pub fn acknowledger_signal(&self, text: &str) -> bool {
        self.acknowledger.is_match(text)
    }

    /// Classifies one exchange. Missing text is "no signal".
    pub fn detect(
        &self,
        closer_text: Option<&str>,
        acknowledger_text: Option<&str>,
    ) -> ClosureSignals {
        ClosureSignals {
            closer: closer_text.is_some_and(|t| self.closer_signal(t)),
            acknowledger: acknowledger_text.is_some_and(|t| self.acknowledger_signal(t)),
        }
    }
}
