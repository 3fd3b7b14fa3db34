//! Imports command implementation.

use anyhow::{Context, Result};
use contract_lint::{RunMode, RunOptions};
use std::path::Path;

use super::output;
use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Builds the import graph and returns whether it is free of cycles.
pub fn run(path: &Path, format: OutputFormat, source: &ConfigSource) -> Result<bool> {
    let config = source.load()?;
    let report = contract_lint::run(RunMode::AnalyzeImports, path, config, &RunOptions::default())
        .context("Import analysis failed")?;
    output::print(&report, path, format)?;
    Ok(report.passed())
}
