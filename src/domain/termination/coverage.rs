//! Motivational-interviewing technique coverage.
//!
//! Folds per-turn detector results over the transcript into one flag per
//! technique. A flag turns true the first time any scanned turn shows the
//! technique and stays true for the rest of the conversation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::detectors::SignalDetectors;
use super::errors::TerminationError;
use crate::domain::conversation::{ConversationContext, Speaker, Turn};

/// A motivational-interviewing technique the conversation must exhibit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageCategory {
    OpenEndedQuestion,
    Reflection,
    AutonomySupport,
    Summary,
}

impl CoverageCategory {
    /// All categories, in reporting order.
    pub const ALL: [CoverageCategory; 4] = [
        CoverageCategory::OpenEndedQuestion,
        CoverageCategory::Reflection,
        CoverageCategory::AutonomySupport,
        CoverageCategory::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenEndedQuestion => "open_ended_question",
            Self::Reflection => "reflection",
            Self::AutonomySupport => "autonomy_support",
            Self::Summary => "summary",
        }
    }
}

impl fmt::Display for CoverageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoverageCategory {
    type Err = TerminationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoverageCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| TerminationError::invalid_category(s))
    }
}

/// Per-category coverage flags. Always holds all four categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageMap(BTreeMap<CoverageCategory, bool>);

impl CoverageMap {
    /// A map with every category uncovered.
    pub fn empty() -> Self {
        Self(CoverageCategory::ALL.into_iter().map(|c| (c, false)).collect())
    }

    pub fn get(&self, category: CoverageCategory) -> bool {
        self.0.get(&category).copied().unwrap_or(false)
    }

    /// Marks a category covered. Coverage never reverts.
    pub fn mark(&mut self, category: CoverageCategory) {
        self.0.insert(category, true);
    }

    /// Union of two maps.
    pub fn merge(&mut self, other: &CoverageMap) {
        for category in other.covered() {
            self.mark(category);
        }
    }

    pub fn is_complete(&self) -> bool {
        CoverageCategory::ALL.into_iter().all(|c| self.get(c))
    }

    pub fn covered(&self) -> Vec<CoverageCategory> {
        CoverageCategory::ALL
            .into_iter()
            .filter(|c| self.get(*c))
            .collect()
    }

    /// Uncovered categories, in reporting order.
    pub fn missing(&self) -> Vec<CoverageCategory> {
        CoverageCategory::ALL
            .into_iter()
            .filter(|c| !self.get(*c))
            .collect()
    }

    pub fn satisfied_count(&self) -> usize {
        self.covered().len()
    }

    /// Fraction of categories covered, in `[0.0, 1.0]`.
    pub fn ratio(&self) -> f64 {
        self.satisfied_count() as f64 / CoverageCategory::ALL.len() as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = (CoverageCategory, bool)> + '_ {
        self.0.iter().map(|(c, v)| (*c, *v))
    }
}

impl Default for CoverageMap {
    fn default() -> Self {
        Self::empty()
    }
}

/// Conversation-level inputs to the readiness check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub coverage: CoverageMap,
    /// Carried from the context, not recounted.
    pub turn_count: u32,
    pub assistant_turns: usize,
    pub student_turns: usize,
}

impl CoverageSummary {
    /// Share of transcript turns written by the student.
    pub fn student_share(&self) -> f64 {
        let total = self.assistant_turns + self.student_turns;
        if total == 0 {
            0.0
        } else {
            self.student_turns as f64 / total as f64
        }
    }
}

/// Reduces detector output over a transcript.
#[derive(Debug, Clone, Copy)]
pub struct CoverageAggregator<'a> {
    detectors: &'a SignalDetectors,
    speaker: Speaker,
}

impl<'a> CoverageAggregator<'a> {
    /// Creates an aggregator scanning turns written by `speaker`.
    pub fn new(detectors: &'a SignalDetectors, speaker: Speaker) -> Self {
        Self { detectors, speaker }
    }

    /// Coverage over every scanned turn in `history`.
    ///
    /// Stops scanning once all categories are covered.
    pub fn coverage(&self, history: &[Turn]) -> CoverageMap {
        let mut map = CoverageMap::empty();
        let mut pending: Vec<CoverageCategory> = CoverageCategory::ALL.to_vec();

        for turn in history.iter().filter(|t| t.speaker == self.speaker) {
            pending.retain(|category| {
                if self.detectors.covers(&turn.text, *category) {
                    map.mark(*category);
                    false
                } else {
                    true
                }
            });
            if pending.is_empty() {
                break;
            }
        }

        map
    }

    /// Coverage for a category given by its persisted name.
    pub fn covers_named(&self, history: &[Turn], name: &str) -> Result<bool, TerminationError> {
        let category: CoverageCategory = name.parse()?;
        Ok(history
            .iter()
            .filter(|t| t.speaker == self.speaker)
            .any(|t| self.detectors.covers(&t.text, category)))
    }

    pub fn summarize(&self, context: &ConversationContext) -> CoverageSummary {
        let history = context.history();
        let assistant_turns = history
            .iter()
            .filter(|t| t.speaker == Speaker::Assistant)
            .count();

        CoverageSummary {
            coverage: self.coverage(history),
            turn_count: context.turn_count(),
            assistant_turns,
            student_turns: history.len() - assistant_turns,
        }
    }
}
