//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::config_resolver::project_config_name;

const DEFAULT_CONFIG: &str = r##"# contract-lint configuration

# Rule preset: recommended | strict | minimal
preset = "recommended"

# Scans fail on violations at or above this severity: error | warning | info
fail_on = "error"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./interfaces"

# Glob patterns to exclude from analysis
exclude = [
    "**/tests/**",
    "**/test/**",
    "**/test_*.py",
    "**/*_test.py",
    "**/conftest.py",
    "**/validation/**",
]

# Paths containing any of these substrings are skipped
exclude_substrings = ["example"]

# Respect .gitignore files
respect_gitignore = true

# Files containing this comment are neither checked nor rewritten
skip_sentinel = "# contract-lint: skip-file"

# Each rule can be enabled/disabled and have its severity overridden

[rules.forbidden-import]
enabled = true
# severity = "warning"
# denylist = ["os", "json", "requests"]

[rules.missing-marker]
enabled = true
# exempt_return_types = ["AsyncIterator", "AsyncIterable", "AsyncGenerator", "Coroutine"]

# [rules.vague-naming]
# enabled = true

[fix]
kinds = ["nullable-union", "multi-arm-union", "forward-reference", "awaitable-wrapping"]
backup_suffix = ".bak"

[graph]
# Count imports under `if TYPE_CHECKING:` as dependencies
include_type_checking = false
"##;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new(project_config_name());

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {} to configure rules", config_path.display());
    println!("  2. Run: contract-lint scan");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract_lint::{Config, TransformKind};

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).expect("template parses");
        assert_eq!(config.preset.as_deref(), Some("recommended"));
        assert_eq!(config.fix.kinds, TransformKind::ALL.to_vec());
        assert!(!config.graph.include_type_checking);
        assert!(config.is_rule_enabled("forbidden-import"));
        assert_eq!(config.analyzer.skip_sentinel, "# contract-lint: skip-file");
        assert_eq!(config.fix.backup_suffix, ".bak");
    }
}
