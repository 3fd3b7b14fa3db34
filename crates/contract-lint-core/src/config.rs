//! Configuration types for contract-lint.

use crate::types::{Severity, TransformKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Default file-level bypass token.
pub const DEFAULT_SKIP_SENTINEL: &str = "# contract-lint: skip-file";

/// Default suffix appended to backup files.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";

/// Top-level configuration for contract-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use (e.g., "recommended", "strict", "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for scan failure (default: "error").
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,

    /// Transformation engine configuration.
    #[serde(default)]
    pub fix: FixConfig,

    /// Dependency graph configuration.
    #[serde(default)]
    pub graph: GraphConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Gets the configuration block of a rule, if present.
    #[must_use]
    pub fn rule(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }

    /// Resolves the `fail_on` threshold.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown severity name.
    pub fn fail_on_severity(&self) -> Result<Severity, ConfigError> {
        self.fail_on
            .as_deref()
            .map_or(Ok(Severity::Error), |s| {
                s.parse().map_err(|message| ConfigError::Invalid { message })
            })
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,

    /// Glob patterns to include (if empty, all *.py files).
    #[serde(default)]
    pub include: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of parallel file analyses.
    #[serde(default)]
    pub parallelism: Option<usize>,

    /// Comment token that makes the rule engine skip a whole file.
    #[serde(default = "default_skip_sentinel")]
    pub skip_sentinel: String,

    /// Files whose relative path contains any of these substrings are skipped.
    #[serde(default = "default_exclude_substrings")]
    pub exclude_substrings: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: default_excludes(),
            include: Vec::new(),
            respect_gitignore: true,
            parallelism: None,
            skip_sentinel: default_skip_sentinel(),
            exclude_substrings: default_exclude_substrings(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_excludes() -> Vec<String> {
    [
        "**/tests/**",
        "**/test/**",
        "**/test_*.py",
        "**/*_test.py",
        "**/conftest.py",
        "**/validation/**",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_skip_sentinel() -> String {
    DEFAULT_SKIP_SENTINEL.to_string()
}

fn default_exclude_substrings() -> Vec<String> {
    vec!["example".to_string()]
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }

    /// Gets a string array option, `None` when the key is absent.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Option<Vec<String>> {
        self.options.get(key).and_then(|v| v.as_array()).map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
    }
}

/// Transformation engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixConfig {
    /// Enabled transformation kinds.
    #[serde(default = "default_kinds")]
    pub kinds: Vec<TransformKind>,

    /// Suffix appended to the original path for the backup copy.
    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            kinds: default_kinds(),
            backup_suffix: default_backup_suffix(),
        }
    }
}

fn default_kinds() -> Vec<TransformKind> {
    TransformKind::ALL.to_vec()
}

fn default_backup_suffix() -> String {
    DEFAULT_BACKUP_SUFFIX.to_string()
}

/// Dependency graph configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Count imports under `if TYPE_CHECKING:` as edges.
    #[serde(default)]
    pub include_type_checking: bool,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A value is syntactically valid but not accepted.
    #[error("Invalid config value: {message}")]
    Invalid {
        /// Description of the rejected value.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert!(config.rules.is_empty());
        assert_eq!(config.analyzer.skip_sentinel, DEFAULT_SKIP_SENTINEL);
        assert_eq!(config.fix.kinds.len(), 4);
        assert_eq!(config.fix.backup_suffix, ".bak");
        assert!(!config.graph.include_type_checking);
        assert_eq!(config.fail_on_severity().unwrap(), Severity::Error);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
fail_on = "warning"

[analyzer]
root = "./src"
exclude = ["**/generated/**"]
parallelism = 2

[rules.forbidden-import]
enabled = true
severity = "warning"
denylist = ["os", "json"]

[rules.vague-naming]
enabled = false

[fix]
kinds = ["nullable-union", "multi-arm-union"]

[graph]
include_type_checking = true
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert_eq!(config.analyzer.exclude, vec!["**/generated/**".to_string()]);
        assert_eq!(config.analyzer.parallelism, Some(2));
        assert!(config.is_rule_enabled("forbidden-import"));
        assert!(!config.is_rule_enabled("vague-naming"));
        assert_eq!(
            config.rule_severity("forbidden-import"),
            Some(Severity::Warning)
        );
        assert_eq!(
            config.rule("forbidden-import").unwrap().get_str_array("denylist"),
            Some(vec!["os".to_string(), "json".to_string()])
        );
        assert_eq!(
            config.fix.kinds,
            vec![TransformKind::NullableUnion, TransformKind::MultiArmUnion]
        );
        assert!(config.graph.include_type_checking);
        assert_eq!(config.fail_on_severity().unwrap(), Severity::Warning);
    }

    #[test]
    fn test_invalid_fail_on() {
        let config = Config::parse("fail_on = \"fatal\"").unwrap();
        assert!(matches!(
            config.fail_on_severity(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_unknown_kind_is_parse_error() {
        let result = Config::parse("[fix]\nkinds = [\"sort-imports\"]\n");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
