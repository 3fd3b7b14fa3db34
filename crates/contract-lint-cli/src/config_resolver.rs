//! Configuration lookup and loading.
//!
//! Priority order:
//!
//! 1. `--config` flag
//! 2. `{project}/contract-lint.toml` or `.contract-lint.toml`
//! 3. `~/.contract-lint/config.toml`, or `$CONTRACT_LINT_CONFIG_DIR/config.toml`
//! 4. built-in defaults

use anyhow::{Context, Result};
use contract_lint::{Config, CONFIG_CANDIDATES};
use std::path::{Path, PathBuf};

/// Environment variable overriding the global config directory.
pub const CONFIG_DIR_ENV: &str = "CONTRACT_LINT_CONFIG_DIR";

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found next to the analyzed files.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Reads and parses the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or not valid configuration.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("No config file found, using defaults");
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Resolves where the configuration for `project_dir` comes from.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_in(project_dir, explicit, global_config_dir())
}

fn resolve_in(project_dir: &Path, explicit: Option<&Path>, global_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = contract_lint::find_config(project_dir) {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::Global)
}

/// Global config directory: `$CONTRACT_LINT_CONFIG_DIR`, else `~/.contract-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".contract-lint"))
}

/// Name of the file `init` writes.
#[must_use]
pub fn project_config_name() -> &'static str {
    CONFIG_CANDIDATES[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_wins_and_is_not_checked() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        fs::write(tmp.path().join("contract-lint.toml"), "").expect("Failed to write");

        let result = resolve_in(tmp.path(), Some(Path::new("/nonexistent.toml")), None);
        assert_eq!(
            result,
            ConfigSource::Explicit(PathBuf::from("/nonexistent.toml"))
        );
        assert!(result.load().is_err());
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        fs::write(tmp.path().join("contract-lint.toml"), "").expect("Failed to write");
        fs::write(tmp.path().join(".contract-lint.toml"), "").expect("Failed to write");

        let result = resolve_in(tmp.path(), None, None);
        assert_eq!(
            result,
            ConfigSource::Project(tmp.path().join("contract-lint.toml"))
        );
    }

    #[test]
    fn global_only_without_project_config() {
        let project = TempDir::new().expect("Failed to create temp dir");
        let global = TempDir::new().expect("Failed to create temp dir");
        fs::write(global.path().join("config.toml"), "preset = \"strict\"\n")
            .expect("Failed to write");

        let result = resolve_in(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Global(global.path().join("config.toml")));
        let config = result.load().expect("global config");
        assert_eq!(config.preset.as_deref(), Some("strict"));

        fs::write(project.path().join(".contract-lint.toml"), "").expect("Failed to write");
        let result = resolve_in(project.path(), None, Some(global.path().to_path_buf()));
        assert!(matches!(result, ConfigSource::Project(_)));
    }

    #[test]
    fn empty_global_dir_falls_back_to_defaults() {
        let project = TempDir::new().expect("Failed to create temp dir");
        let global = TempDir::new().expect("Failed to create temp dir");

        let result = resolve_in(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
        assert!(result.path().is_none());
        assert!(result.load().expect("defaults").preset.is_none());
    }

    #[test]
    fn invalid_project_config_is_an_error() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        fs::write(tmp.path().join("contract-lint.toml"), "preset = [").expect("Failed to write");

        let err = resolve_in(tmp.path(), None, None)
            .load()
            .expect_err("invalid TOML");
        assert!(format!("{err:#}").contains("Failed to load config"));
    }
}
