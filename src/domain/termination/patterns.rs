//! Pattern sets used by the signal detectors.
//!
//! Every set is a list of case-insensitive regular expressions searched
//! anywhere in a turn. The built-in lists can be replaced per deployment
//! through a YAML overrides file.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use super::ambiguity::{AmbiguityFilter, DEFAULT_AMBIGUOUS_PHRASES};
use super::coverage::CoverageCategory;
use super::errors::TerminationError;

pub const OPEN_ENDED_QUESTION_PATTERNS: &[&str] = &[
    r"^\s*(what|how|why|in what ways?)\b[^.!?]*\?",
    r"\b(tell me (more )?about|walk me through|help me understand)\b",
    r"\b(could|can|would) you (describe|tell me|share|explain|say more)\b",
    r"\bwhat (brings you|else|concerns you|matters|worries you|would it take)\b",
    r"\bhow (do|did|does|would) (you|that|this) (feel|affect|see|think)\b",
];

pub const REFLECTION_PATTERNS: &[&str] = &[
    r"\b(it )?sounds like\b",
    r"\bit seems (like |that |as if )?you\b",
    r"\byou['’]?re feeling\b",
    r"\bso you['’]?re (saying|feeling|worried|concerned)\b",
    r"\bwhat i['’]?m hearing\b",
    r"\bi hear (that )?you\b",
    r"\bif i understand (you )?correctly\b",
    r"\byou['’]?ve been (feeling|struggling|worried|trying)\b",
];

pub const AUTONOMY_SUPPORT_PATTERNS: &[&str] = &[
    r"\b(it['’]?s|that['’]?s|it is|that is) (completely |entirely |really |ultimately )?(your (choice|decision|call)|up to you)\b",
    r"\bup to you\b",
    r"\byou (get to |can )?decide\b",
    r"\bwhatever you (decide|choose)\b",
    r"\bwhen(ever)? you['’]?re ready\b",
    r"\byou['’]?re (the expert|in control|in charge)\b",
    r"\bwhat (would|do) you (want|like|prefer) to do\b",
    r"\byour (own )?(choice|decision)\b",
];

pub const SUMMARY_PATTERNS: &[&str] = &[
    r"\b(to summari[sz]e|in summary|let me summari[sz]e|summing up|to sum (it )?up|to recap)\b",
    r"\bso far,? (we['’]?ve|you['’]?ve|we have|you have)\b",
    r"\blet me (make sure|see if|check that) i('ve)? (understand|got|have) (this|it|that|you)?\b",
    r"\b(what|everything) we['’]?ve (discussed|talked about|covered)\b",
    r"\b(we have|we['’]?ve) (discussed|talked about|covered) (a lot|several|a few)\b",
];

pub const EXPLICIT_CONFIRMATION_PATTERNS: &[&str] = &[
    r"\b(let['’]?s|let us|we can|can we|could we|i['’]?d like to|i would like to|i want to|please)\s+(end|finish|stop|wrap (it |this )?up|close|conclude)\b",
    r"\b(end|finish|stop|close|conclude)\s+(the|this|our)\s+(session|conversation|chat|interview|consultation)\b",
    r"\b(i['’]?m|i am|we['’]?re|we are)\s+(done|finished|all set|ready to (end|finish|stop))\b",
    r"\byes,?\s+(please\s+)?(end|stop|finish)\b",
    r"\bthat['’]?s all(\s+for\s+(today|now))?[\s.!,]*((thanks|thank you)[\s.!]*)?$",
    r"\bnothing (else|more) to (add|discuss|say)\b",
    r"\bgood\s?bye\b",
];

pub const SOFT_CLOSING_PATTERNS: &[&str] = &[
    r"\b(thanks|thank you|thx)\b.*\b(bye|good\s?bye|see you|take care)\b",
    r"\b(bye|good\s?bye)\b.*\b(thanks|thank you)\b",
    r"\b(i['’]?m|i am)\s+(done|finished|all set|good for (today|now))\b",
    r"\blet['’]?s\s+(wrap (it |this )?up|call it (a day|here)|stop (here|there)|end (here|there|it))\b",
    r"\b(that['’]?s|that is)\s+(all|everything)(\s+for\s+(today|now))?[\s.!,]*((thanks|thank you)[\s.!]*)?$",
    r"\bhave a (good|great|nice) (day|one|evening|week)\b",
    r"\b(see you|talk to you)\s+(later|soon|next time)\b",
    r"\bgood\s?bye\b",
];

pub const CLOSING_ACKNOWLEDGMENT_PATTERNS: &[&str] = &[
    r"\byou['’]?re (very |most )?welcome\b",
    r"\bgood\s?bye\b",
    r"\bbye\b",
    r"\bglad (i|we) could help\b",
    r"\btake care(\s+of\s+yourself)?\s*([.!,]|$)",
    r"\b(all the best|best of luck)\b",
    r"\bgood luck\s*([.!,]|$|with (everything|it all))",
    r"\b(it was|it['’]?s been) (nice|good|great|a pleasure) (talking|speaking|meeting|chatting)\b",
    r"\bthank you for (your time|talking|listening|the conversation|your help)\b",
];

/// Negated closing requests ("let's not end", "I don't want to say goodbye").
/// A match vetoes confirmation and the closer half of the closure pairs.
pub const NEGATED_CLOSING_PATTERNS: &[&str] = &[
    r"\b(not|never|cannot|\w+n['’]t)\s+(\w+\s+){0,3}(end|finish|stop|close|conclude|wrap|done|leave|quit|say\s+good\s?bye|good\s?bye|bye)\b",
    r"\b(not|never)\s+(yet|now|so fast)\b",
];

pub const CLOSURE_INVITATION_PATTERNS: &[&str] = &[
    r"\b(any|are there any|do you have any)\s+(other|more|further|last)\s+(questions|concerns)\b",
    r"\bis there anything else\b",
    r"\bfeel free to (come back|reach out|contact|call)\b",
    r"\b(don['’]?t hesitate|you can always) (to )?(come back|reach out|call|contact)\b",
    r"\b(come|check) back (any ?time|whenever|if)\b",
];

pub const SATISFACTION_PATTERNS: &[&str] = &[
    r"\bthat (really )?(helps|helped)\b",
    r"\bi\s+feel\s+(much |a lot |a bit |so much )?(better|relieved|reassured)\b",
    r"\bi['’]?m\s+(feeling\s+)?(much |a lot |a bit |so much )?(better|relieved|reassured)\b",
    r"\bthat answers (all )?(of )?my questions\b",
    r"\b(that['’]?s|that is|this is) (really |very )?(helpful|reassuring)\b",
    r"\bthat makes (a lot of |more )?sense( now)?\b",
    r"\bno (more|other|further) questions\b",
    r"\bi (think i )?(have|got) (what|everything) i need(ed)?\b",
];

static BUILTIN_CATALOG: Lazy<PatternCatalog> =
    Lazy::new(|| PatternCatalog::builtin().expect("built-in termination patterns must compile"));

/// A named list of compiled, case-insensitive patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    name: String,
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compiles every source pattern, failing on the first invalid one.
    pub fn compile<I, S>(name: impl Into<String>, sources: I) -> Result<Self, TerminationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        let patterns = sources
            .into_iter()
            .map(|source| {
                let source = source.as_ref();
                RegexBuilder::new(source)
                    .case_insensitive(true)
                    .build()
                    .map_err(|err| TerminationError::InvalidPattern {
                        set: name.clone(),
                        pattern: source.to_string(),
                        source: err,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { name, patterns })
    }

    /// Returns true if any pattern is found anywhere in `text`.
    ///
    /// Blank text never matches.
    pub fn is_match(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.patterns.iter().any(|p| p.is_match(text))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Every pattern set the detectors consult.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    open_ended_question: PatternSet,
    reflection: PatternSet,
    autonomy_support: PatternSet,
    summary: PatternSet,
    explicit_confirmation: PatternSet,
    soft_closing: PatternSet,
    closing_acknowledgment: PatternSet,
    closure_invitation: PatternSet,
    satisfaction: PatternSet,
    negated_closing: PatternSet,
    ambiguity: AmbiguityFilter,
}

impl PatternCatalog {
    fn builtin() -> Result<Self, TerminationError> {
        Ok(Self {
            open_ended_question: PatternSet::compile(
                "open_ended_question",
                OPEN_ENDED_QUESTION_PATTERNS,
            )?,
            reflection: PatternSet::compile("reflection", REFLECTION_PATTERNS)?,
            autonomy_support: PatternSet::compile("autonomy_support", AUTONOMY_SUPPORT_PATTERNS)?,
            summary: PatternSet::compile("summary", SUMMARY_PATTERNS)?,
            explicit_confirmation: PatternSet::compile(
                "explicit_confirmation",
                EXPLICIT_CONFIRMATION_PATTERNS,
            )?,
            soft_closing: PatternSet::compile("soft_closing", SOFT_CLOSING_PATTERNS)?,
            closing_acknowledgment: PatternSet::compile(
                "closing_acknowledgment",
                CLOSING_ACKNOWLEDGMENT_PATTERNS,
            )?,
            closure_invitation: PatternSet::compile(
                "closure_invitation",
                CLOSURE_INVITATION_PATTERNS,
            )?,
            satisfaction: PatternSet::compile("satisfaction", SATISFACTION_PATTERNS)?,
            negated_closing: PatternSet::compile("negated_closing", NEGATED_CLOSING_PATTERNS)?,
            ambiguity: AmbiguityFilter::new(DEFAULT_AMBIGUOUS_PHRASES.iter().copied()),
        })
    }

    /// Returns the catalog with any overridden sets replaced.
    pub fn with_overrides(
        mut self,
        overrides: &PatternOverrides,
    ) -> Result<Self, TerminationError> {
        fn replace(
            slot: &mut PatternSet,
            sources: &Option<Vec<String>>,
        ) -> Result<(), TerminationError> {
            if let Some(sources) = sources {
                *slot = PatternSet::compile(slot.name().to_string(), sources)?;
            }
            Ok(())
        }

        replace(&mut self.open_ended_question, &overrides.open_ended_question)?;
        replace(&mut self.reflection, &overrides.reflection)?;
        replace(&mut self.autonomy_support, &overrides.autonomy_support)?;
        replace(&mut self.summary, &overrides.summary)?;
        replace(&mut self.explicit_confirmation, &overrides.explicit_confirmation)?;
        replace(&mut self.soft_closing, &overrides.soft_closing)?;
        replace(&mut self.closing_acknowledgment, &overrides.closing_acknowledgment)?;
        replace(&mut self.closure_invitation, &overrides.closure_invitation)?;
        replace(&mut self.satisfaction, &overrides.satisfaction)?;
        replace(&mut self.negated_closing, &overrides.negated_closing)?;
        if let Some(phrases) = &overrides.ambiguous_phrases {
            self.ambiguity = AmbiguityFilter::new(phrases.iter().map(String::as_str));
        }
        Ok(self)
    }

    /// Returns the pattern set for a coverage category.
    pub fn coverage(&self, category: CoverageCategory) -> &PatternSet {
        match category {
            CoverageCategory::OpenEndedQuestion => &self.open_ended_question,
            CoverageCategory::Reflection => &self.reflection,
            CoverageCategory::AutonomySupport => &self.autonomy_support,
            CoverageCategory::Summary => &self.summary,
        }
    }

    pub fn explicit_confirmation(&self) -> &PatternSet {
        &self.explicit_confirmation
    }

    pub fn soft_closing(&self) -> &PatternSet {
        &self.soft_closing
    }

    pub fn closing_acknowledgment(&self) -> &PatternSet {
        &self.closing_acknowledgment
    }

    pub fn closure_invitation(&self) -> &PatternSet {
        &self.closure_invitation
    }

    pub fn satisfaction(&self) -> &PatternSet {
        &self.satisfaction
    }

    pub fn negated_closing(&self) -> &PatternSet {
        &self.negated_closing
    }

    pub fn ambiguity(&self) -> &AmbiguityFilter {
        &self.ambiguity
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        BUILTIN_CATALOG.clone()
    }
}

/// Per-deployment replacements for the built-in pattern sets.
///
/// Sets left out keep their built-in lists. Unknown keys are rejected so a
/// misspelled set name does not silently fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternOverrides {
    #[serde(default)]
    pub open_ended_question: Option<Vec<String>>,
    #[serde(default)]
    pub reflection: Option<Vec<String>>,
    #[serde(default)]
    pub autonomy_support: Option<Vec<String>>,
    #[serde(default)]
    pub summary: Option<Vec<String>>,
    #[serde(default)]
    pub explicit_confirmation: Option<Vec<String>>,
    #[serde(default)]
    pub soft_closing: Option<Vec<String>>,
    #[serde(default)]
    pub closing_acknowledgment: Option<Vec<String>>,
    #[serde(default)]
    pub closure_invitation: Option<Vec<String>>,
    #[serde(default)]
    pub satisfaction: Option<Vec<String>>,
    #[serde(default)]
    pub negated_closing: Option<Vec<String>>,
    #[serde(default)]
    pub ambiguous_phrases: Option<Vec<String>>,
}

impl PatternOverrides {
    /// Parses overrides from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Reads and parses an overrides file.
    pub fn from_file(path: &Path) -> Result<Self, TerminationError> {
        let raw = std::fs::read_to_string(path).map_err(|err| TerminationError::PatternFile {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::from_yaml_str(&raw).map_err(|err| TerminationError::PatternFile {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }
}
