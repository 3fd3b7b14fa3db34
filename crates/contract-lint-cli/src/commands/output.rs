//! Shared output formatting for run reports.

use anyhow::Result;
use contract_lint::fix::render_diff;
use contract_lint::{RunMode, RunReport, Severity, Violation, ViolationDiagnostic};
use miette::NamedSource;
use std::path::Path;

use crate::OutputFormat;

/// Print a run report in the specified format.
///
/// `path` is the analyzed path; report paths are relative to it.
pub fn print(report: &RunReport, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
        OutputFormat::Pretty => print_pretty(report, base_dir(path)),
    }
    Ok(())
}

fn base_dir(path: &Path) -> &Path {
    if path.is_file() {
        path.parent().unwrap_or(path)
    } else {
        path
    }
}

fn severity_indicator(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
        Severity::Info => "\x1b[34minfo\x1b[0m",
    }
}

fn print_violation(violation: &Violation) {
    println!(
        "{} {} at {}:{}:{}",
        violation.code,
        violation.rule,
        violation.location.file.display(),
        violation.location.line,
        violation.location.column,
    );
    println!(
        "  {}: {}",
        severity_indicator(violation.severity),
        violation.message
    );
    if let Some(suggestion) = &violation.suggestion {
        println!("  = help: {}", suggestion.message);
    }
    println!();
}

fn print_text(report: &RunReport) {
    for violation in &report.violations {
        print_violation(violation);
    }
    print_findings(report);
    print_summary(report);
}

/// Transformations, cycles and file issues, shared by text and pretty output.
fn print_findings(report: &RunReport) {
    if !report.transformations.is_empty() {
        print!("{}", render_diff(&report.transformations));
    }
    for cycle in &report.cycles {
        println!("\x1b[31mcycle\x1b[0m: {cycle}");
    }
    if !report.cycles.is_empty() {
        println!();
    }
    for issue in &report.issues {
        println!(
            "\x1b[33mskipped\x1b[0m {} ({}): {}",
            issue.file.display(),
            issue.kind,
            issue.message
        );
    }
}

fn print_summary(report: &RunReport) {
    let summary = report.summary();
    let color = if !summary.passed {
        "\x1b[31m"
    } else if summary.warnings > 0 || summary.issues > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    let line = match report.mode {
        RunMode::Scan => format!(
            "Found {} error(s), {} warning(s), {} info(s) in {} file(s); {} pure interface(s)",
            summary.errors,
            summary.warnings,
            summary.infos,
            summary.files_checked,
            summary.pure_interfaces
        ),
        RunMode::FixDryRun => format!(
            "{} transformation(s) proposed in {} file(s); nothing written",
            summary.transformations, summary.files_checked
        ),
        RunMode::FixApply => format!(
            "{} transformation(s) applied, {} file(s) rewritten",
            summary.transformations, summary.files_modified
        ),
        RunMode::AnalyzeImports => format!(
            "Found {} import cycle(s) in {} file(s)",
            summary.cycles, summary.files_checked
        ),
    };
    println!("{color}{line}\x1b[0m");
}

fn print_json(report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &RunReport) {
    for violation in &report.violations {
        println!(
            "{}:{}:{}: {} [{}] {}",
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
            violation.severity,
            violation.code,
            violation.message,
        );
    }
    for t in &report.transformations {
        println!(
            "{}:{}:{}: [{}] {} -> {}",
            t.file.display(),
            t.line,
            t.column,
            t.kind,
            t.original_text.escape_debug(),
            t.replacement_text.escape_debug(),
        );
    }
    for cycle in &report.cycles {
        println!("cycle: {cycle}");
    }
    for issue in &report.issues {
        println!(
            "{}: issue [{}] {}",
            issue.file.display(),
            issue.kind,
            issue.message
        );
    }
}

fn print_pretty(report: &RunReport, base: &Path) {
    for violation in &report.violations {
        let diagnostic = miette::Report::new(ViolationDiagnostic::from(violation));
        let diagnostic = match std::fs::read_to_string(base.join(&violation.location.file)) {
            Ok(text) => diagnostic.with_source_code(NamedSource::new(
                violation.location.file.display().to_string(),
                text,
            )),
            Err(e) => {
                tracing::debug!(
                    "No source for {}: {}",
                    violation.location.file.display(),
                    e
                );
                diagnostic
            }
        };
        println!("{diagnostic:?}");
    }
    print_findings(report);
    print_summary(report);
}
