//! Termination policy configuration

use std::path::PathBuf;

use serde::Deserialize;

use super::error::{ConfigError, ValidationError};
use crate::domain::conversation::Speaker;
use crate::domain::termination::{
    PatternCatalog, PatternOverrides, PolicyConfig, DEFAULT_END_TOKEN, DEFAULT_TURN_FLOOR,
};

/// Termination policy settings
#[derive(Debug, Clone, Deserialize)]
pub struct PolicySettings {
    /// Student turns required before ending may be proposed (0 disables)
    #[serde(default = "default_turn_floor")]
    pub turn_floor: u32,

    /// Marker the assistant emits to close the session
    #[serde(default = "default_end_token")]
    pub end_token: String,

    /// Whose turns count toward technique coverage
    #[serde(default = "default_coverage_speaker")]
    pub coverage_speaker: Speaker,

    /// Optional YAML file replacing built-in pattern sets
    pub patterns_file: Option<PathBuf>,
}

impl PolicySettings {
    /// Validate policy settings
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end_token.trim().is_empty() {
            return Err(ValidationError::EmptyEndToken);
        }
        if let Some(path) = &self.patterns_file {
            if !path.is_file() {
                return Err(ValidationError::PatternsFileUnreadable(path.clone()));
            }
        }
        Ok(())
    }

    /// Build the engine configuration, compiling any pattern overrides
    pub fn to_policy_config(&self) -> Result<PolicyConfig, ConfigError> {
        let catalog = match &self.patterns_file {
            Some(path) => {
                let overrides = PatternOverrides::from_file(path)?;
                PatternCatalog::default().with_overrides(&overrides)?
            }
            None => PatternCatalog::default(),
        };

        Ok(PolicyConfig::new(self.turn_floor, self.end_token.clone())
            .with_coverage_speaker(self.coverage_speaker)
            .with_catalog(catalog))
    }
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            turn_floor: default_turn_floor(),
            end_token: default_end_token(),
            coverage_speaker: default_coverage_speaker(),
            patterns_file: None,
        }
    }
}

fn default_turn_floor() -> u32 {
    DEFAULT_TURN_FLOOR
}

fn default_end_token() -> String {
    DEFAULT_END_TOKEN.to_string()
}

fn default_coverage_speaker() -> Speaker {
    Speaker::Assistant
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::termination::CoverageCategory;
    use std::io::Write;

    #[test]
    fn test_policy_defaults() {
        let settings = PolicySettings::default();
        assert_eq!(settings.turn_floor, 10);
        assert_eq!(settings.end_token, "<END_CONVERSATION>");
        assert_eq!(settings.coverage_speaker, Speaker::Assistant);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_rejects_blank_end_token() {
        let settings = PolicySettings {
            end_token: "  ".to_string(),
            ..PolicySettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ValidationError::EmptyEndToken)
        ));
    }

    #[test]
    fn test_rejects_missing_patterns_file() {
        let settings = PolicySettings {
            patterns_file: Some(PathBuf::from("/nonexistent/patterns.yaml")),
            ..PolicySettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ValidationError::PatternsFileUnreadable(_))
        ));
    }

    #[test]
    fn test_patterns_file_overrides_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "summary:\n  - '\\bto recap\\b'").unwrap();

        let settings = PolicySettings {
            turn_floor: 3,
            patterns_file: Some(file.path().to_path_buf()),
            ..PolicySettings::default()
        };
        let config = settings.to_policy_config().unwrap();

        assert_eq!(config.turn_floor, 3);
        let summary = config.catalog.coverage(CoverageCategory::Summary);
        assert!(summary.is_match("To recap, you want to cut down."));
        assert!(!summary.is_match("In summary, you want to cut down."));
    }

    #[test]
    fn test_invalid_override_pattern_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reflection:\n  - '(unclosed'").unwrap();

        let settings = PolicySettings {
            patterns_file: Some(file.path().to_path_buf()),
            ..PolicySettings::default()
        };
        assert!(matches!(
            settings.to_policy_config(),
            Err(ConfigError::Patterns(_))
        ));
    }
}
