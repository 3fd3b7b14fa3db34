//! Fix command implementation.

use anyhow::{Context, Result};
use contract_lint::{RunMode, RunOptions, TransformKind};
use std::path::Path;

use super::{output, split_list};
use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the fix command and returns whether it passed.
///
/// Without `apply` nothing is written.
pub fn run(
    path: &Path,
    apply: bool,
    kinds: Option<&str>,
    format: OutputFormat,
    source: &ConfigSource,
) -> Result<bool> {
    let mut config = source.load()?;
    let selected = parse_kinds(kinds)?;
    if !selected.is_empty() {
        config.fix.kinds = selected;
    }

    let mode = if apply {
        RunMode::FixApply
    } else {
        RunMode::FixDryRun
    };
    tracing::debug!("Enabled kinds: {:?}", config.fix.kinds);

    let report = contract_lint::run(mode, path, config, &RunOptions::default())
        .with_context(|| format!("{mode} failed"))?;
    output::print(&report, path, format)?;
    Ok(report.passed())
}

fn parse_kinds(kinds: Option<&str>) -> Result<Vec<TransformKind>> {
    split_list(kinds)
        .iter()
        .map(|k| {
            k.parse::<TransformKind>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid --kinds value `{k}`"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_list() {
        let kinds = parse_kinds(Some("nullable-union,awaitable-wrapping")).expect("kinds");
        assert_eq!(
            kinds,
            vec![TransformKind::NullableUnion, TransformKind::AwaitableWrapping]
        );
        assert!(parse_kinds(None).expect("none").is_empty());
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(parse_kinds(Some("pep604")).is_err());
    }
}
