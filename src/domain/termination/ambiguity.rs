//! Filter for short acknowledgements that must not count as an ending signal.

use std::collections::HashSet;

/// Short acknowledgements that carry no intent to end on their own.
pub const DEFAULT_AMBIGUOUS_PHRASES: &[&str] = &[
    "ok",
    "okay",
    "k",
    "kk",
    "thanks",
    "thank you",
    "thx",
    "ty",
    "sure",
    "yes",
    "yeah",
    "yep",
    "yup",
    "alright",
    "all right",
    "fine",
    "cool",
    "great",
    "good",
    "nice",
    "right",
    "got it",
    "sounds good",
    "no problem",
    "hmm",
    "mhm",
    "uh huh",
];

/// Word limit for the per-word check.
const MAX_AMBIGUOUS_WORDS: usize = 2;

/// Classifies messages made only of filler acknowledgements.
///
/// A message is ambiguous when, after trimming and case folding, it equals
/// one of the phrases, or it has at most two words and each word is itself
/// a phrase. Longer messages are never ambiguous, even if they contain one.
#[derive(Debug, Clone)]
pub struct AmbiguityFilter {
    phrases: HashSet<String>,
}

impl AmbiguityFilter {
    pub fn new<'a>(phrases: impl IntoIterator<Item = &'a str>) -> Self {
        let phrases = phrases
            .into_iter()
            .map(normalize)
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    pub fn is_ambiguous(&self, text: &str) -> bool {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return false;
        }
        if self.phrases.contains(&normalized) {
            return true;
        }

        let words: Vec<&str> = normalized
            .split_whitespace()
            .map(trim_punctuation)
            .filter(|w| !w.is_empty())
            .collect();

        !words.is_empty()
            && words.len() <= MAX_AMBIGUOUS_WORDS
            && words.iter().all(|w| self.phrases.contains(*w))
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

impl Default for AmbiguityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_AMBIGUOUS_PHRASES.iter().copied())
    }
}

fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    trim_punctuation(&collapsed).to_string()
}

fn trim_punctuation(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}
