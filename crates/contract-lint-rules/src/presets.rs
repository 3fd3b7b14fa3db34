//! Rule presets for common configurations.

use crate::{
    ForbiddenConstruct, ForbiddenImport, MissingMarker, NamingPattern, RedundantNaming,
    SignatureShape, VagueNaming,
};
use contract_lint_core::{Config, RuleBox};
use tracing::debug;

/// Preset configurations for contract-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Recommended rules with sensible defaults.
    Recommended,
    /// Strict rules: every rule, literal defaults included.
    Strict,
    /// Minimal rules for gradual adoption.
    Minimal,
}

impl Preset {
    /// Parses a preset name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "recommended" => Some(Self::Recommended),
            "strict" => Some(Self::Strict),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }

    /// Returns the rules for this preset with default settings.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        self.configured_rules(&Config::default())
    }

    /// Returns the rules for this preset, reading rule options from `config`.
    #[must_use]
    pub fn configured_rules(self, config: &Config) -> Vec<RuleBox> {
        let rules = match self {
            Self::Recommended => recommended_rules(config),
            Self::Strict => strict_rules(config),
            Self::Minimal => minimal_rules(config),
        };
        debug!(preset = ?self, count = rules.len(), "Preset rules resolved");
        rules
    }
}

/// Returns the recommended set of rules.
///
/// Every rule except `vague-naming`; literal defaults are reported.
#[must_use]
pub fn recommended_rules(config: &Config) -> Vec<RuleBox> {
    vec![
        Box::new(ForbiddenConstruct::new()),
        Box::new(ForbiddenImport::from_config(config.rule(crate::forbidden_import::NAME))),
        Box::new(NamingPattern::from_config(config.rule(crate::naming_pattern::NAME))),
        Box::new(MissingMarker::from_config(config.rule(crate::missing_marker::NAME))),
        Box::new(SignatureShape::new()),
        Box::new(RedundantNaming::from_config(config.rule(crate::redundant_naming::NAME))),
    ]
}

/// Returns the strict set of rules.
///
/// Includes all recommended rules plus `vague-naming`.
#[must_use]
pub fn strict_rules(config: &Config) -> Vec<RuleBox> {
    let mut rules = recommended_rules(config);
    rules.push(Box::new(VagueNaming::from_config(
        config.rule(crate::vague_naming::NAME),
    )));
    rules
}

/// Returns the minimal set of rules.
///
/// For gradual adoption, only includes:
/// - `forbidden-construct` without literal defaults
/// - `forbidden-import`
/// - `signature-shape`
#[must_use]
pub fn minimal_rules(config: &Config) -> Vec<RuleBox> {
    vec![
        Box::new(ForbiddenConstruct::new().check_defaults(false)),
        Box::new(ForbiddenImport::from_config(config.rule(crate::forbidden_import::NAME))),
        Box::new(SignatureShape::new()),
    ]
}

/// Returns all available rules with default settings.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    strict_rules(&Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_rules() {
        assert_eq!(Preset::Recommended.rules().len(), 6);
        assert_eq!(Preset::Strict.rules().len(), 7);
        assert_eq!(Preset::Minimal.rules().len(), 3);
    }

    #[test]
    fn test_all_rules_have_unique_codes() {
        let rules = all_rules();
        let mut codes: Vec<_> = rules.iter().map(|r| r.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), rules.len());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Preset::from_name("strict"), Some(Preset::Strict));
        assert_eq!(Preset::from_name("lenient"), None);
    }
}
