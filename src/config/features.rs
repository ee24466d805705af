//! Feature flags configuration

use serde::Deserialize;

use crate::domain::conversation::StateRecovery;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FeatureFlags {
    /// Restore unrecognized persisted states as `active` instead of failing
    #[serde(default)]
    pub lenient_state_recovery: bool,
}

impl FeatureFlags {
    /// Recovery mode used when restoring persisted contexts
    pub fn state_recovery(&self) -> StateRecovery {
        if self.lenient_state_recovery {
            StateRecovery::Lenient
        } else {
            StateRecovery::Strict
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_flags_defaults() {
        let flags = FeatureFlags::default();
        assert!(!flags.lenient_state_recovery);
        assert_eq!(flags.state_recovery(), StateRecovery::Strict);
    }

    #[test]
    fn test_feature_flags_deserialization() {
        let json = r#"{ "lenient_state_recovery": true }"#;

        let flags: FeatureFlags = serde_json::from_str(json).unwrap();
        assert!(flags.lenient_state_recovery);
        assert_eq!(flags.state_recovery(), StateRecovery::Lenient);
    }
}
