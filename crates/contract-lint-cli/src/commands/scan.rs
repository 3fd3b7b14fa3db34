//! Scan command implementation.

use anyhow::{Context, Result};
use contract_lint::{RunMode, RunOptions};
use std::path::Path;

use super::{output, split_list};
use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the scan command and returns whether it passed.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules: Option<&str>,
    exclude: Vec<String>,
    source: &ConfigSource,
) -> Result<bool> {
    let config = source.load()?;
    let options = RunOptions {
        rules: split_list(rules),
        excludes: exclude,
    };

    let report =
        contract_lint::run(RunMode::Scan, path, config, &options).context("Scan failed")?;
    output::print(&report, path, format)?;
    Ok(report.passed())
}
