//! Signal detectors.
//!
//! Each detector classifies a single turn against a fixed pattern set.
//! Detectors have no side effects and treat blank text as "no match".

use super::closure::ClosureSignalPair;
use super::coverage::CoverageCategory;
use super::errors::TerminationError;
use super::patterns::PatternCatalog;

/// Sentinel the assistant emits when it considers the session over.
pub const DEFAULT_END_TOKEN: &str = "<END_CONVERSATION>";

/// Stateless classifiers over a pattern catalog and end marker.
#[derive(Debug, Clone)]
pub struct SignalDetectors {
    catalog: PatternCatalog,
    end_token: String,
}

impl SignalDetectors {
    pub fn new(catalog: PatternCatalog, end_token: impl Into<String>) -> Self {
        Self {
            catalog,
            end_token: end_token.into(),
        }
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn end_token(&self) -> &str {
        &self.end_token
    }

    /// True if `text` shows the technique for `category`.
    pub fn covers(&self, text: &str, category: CoverageCategory) -> bool {
        self.catalog.coverage(category).is_match(text)
    }

    /// Same as [`covers`](Self::covers), with the category given by name.
    pub fn covers_named(&self, text: &str, name: &str) -> Result<bool, TerminationError> {
        let category: CoverageCategory = name.parse()?;
        Ok(self.covers(text, category))
    }

    /// True if `text` states an explicit intent to close the session.
    ///
    /// A negated request ("let's not end the session yet") is not one.
    pub fn is_explicit_confirmation(&self, text: &str) -> bool {
        !self.is_negated_closing(text) && self.catalog.explicit_confirmation().is_match(text)
    }

    /// True if `text` refuses or postpones ending.
    pub fn is_negated_closing(&self, text: &str) -> bool {
        self.catalog.negated_closing().is_match(text)
    }

    /// True if `text` is only a filler acknowledgement.
    pub fn is_ambiguous(&self, text: &str) -> bool {
        self.catalog.ambiguity().is_ambiguous(text)
    }

    /// An explicit confirmation that is not blocked by the ambiguity filter.
    pub fn confirms_ending(&self, text: &str) -> bool {
        !self.is_ambiguous(text) && self.is_explicit_confirmation(text)
    }

    /// True if the configured end marker occurs anywhere in `text`.
    pub fn contains_end_token(&self, text: &str) -> bool {
        !self.end_token.is_empty() && text.contains(&self.end_token)
    }

    /// Student soft-closing / assistant acknowledgment pair.
    pub fn initiator_acknowledger(&self) -> ClosureSignalPair<'_> {
        ClosureSignalPair::initiator_acknowledger(&self.catalog)
    }

    /// Closure-invitation / satisfaction pair.
    pub fn closure_satisfaction(&self) -> ClosureSignalPair<'_> {
        ClosureSignalPair::closure_satisfaction(&self.catalog)
    }

    pub fn detect_initiator_end_intent(&self, student_text: &str) -> bool {
        self.initiator_acknowledger().closer_signal(student_text)
    }

    pub fn detect_counterpart_end_ack(&self, assistant_text: &str) -> bool {
        self.initiator_acknowledger().acknowledger_signal(assistant_text)
    }

    pub fn detect_doctor_closure_signal(&self, text: &str) -> bool {
        self.closure_satisfaction().closer_signal(text)
    }

    pub fn detect_patient_satisfaction_signal(&self, text: &str) -> bool {
        self.closure_satisfaction().acknowledger_signal(text)
    }
}

impl Default for SignalDetectors {
    fn default() -> Self {
        Self::new(PatternCatalog::default(), DEFAULT_END_TOKEN)
    }
}
