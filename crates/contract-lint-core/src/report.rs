//! Run-level aggregation and verdict.

use crate::analyzer::sort_violations;
use crate::types::{Category, Cycle, FileIssue, IssueKind, Severity, Transformation, Violation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// What a run was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Detect violations.
    Scan,
    /// Propose transformations without writing.
    FixDryRun,
    /// Apply transformations, with backups.
    FixApply,
    /// Build the dependency graph and look for cycles.
    AnalyzeImports,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan => write!(f, "scan"),
            Self::FixDryRun => write!(f, "fix-dry-run"),
            Self::FixApply => write!(f, "fix-apply"),
            Self::AnalyzeImports => write!(f, "analyze-imports"),
        }
    }
}

/// Everything a run found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Mode the run executed in.
    pub mode: RunMode,
    /// Number of files that entered the pipeline.
    pub files_checked: usize,
    /// Violations sorted by file, line and column.
    pub violations: Vec<Violation>,
    /// Proposed or applied transformations.
    pub transformations: Vec<Transformation>,
    /// Dependency cycles.
    pub cycles: Vec<Cycle>,
    /// Per-file failures that did not stop the run.
    pub issues: Vec<FileIssue>,
    /// Files written in apply mode.
    pub files_modified: Vec<PathBuf>,
    /// Interfaces that are pure structural contracts.
    pub pure_interfaces: usize,
    /// Severity at or above which a scan fails.
    pub fail_on: Severity,
}

/// Stable, machine-readable counts of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Mode the run executed in.
    pub mode: RunMode,
    /// Number of files that entered the pipeline.
    pub files_checked: usize,
    /// Total violations.
    pub violations: usize,
    /// Error-severity violations.
    pub errors: usize,
    /// Warning-severity violations.
    pub warnings: usize,
    /// Info-severity violations.
    pub infos: usize,
    /// Violation counts keyed by category name.
    pub by_category: BTreeMap<String, usize>,
    /// Transformations proposed or applied.
    pub transformations: usize,
    /// Files written.
    pub files_modified: usize,
    /// Dependency cycles.
    pub cycles: usize,
    /// Per-file failures.
    pub issues: usize,
    /// Pure structural interfaces.
    pub pure_interfaces: usize,
    /// Overall verdict.
    pub passed: bool,
}

/// Builds a report from collected results.
///
/// Violations are sorted; nothing else is reordered.
#[must_use]
pub fn aggregate(
    mode: RunMode,
    mut violations: Vec<Violation>,
    transformations: Vec<Transformation>,
    cycles: Vec<Cycle>,
) -> RunReport {
    sort_violations(&mut violations);
    RunReport {
        mode,
        files_checked: 0,
        violations,
        transformations,
        cycles,
        issues: Vec::new(),
        files_modified: Vec::new(),
        pure_interfaces: 0,
        fail_on: Severity::Error,
    }
}

impl RunReport {
    /// Creates an empty report for a mode.
    #[must_use]
    pub fn new(mode: RunMode) -> Self {
        aggregate(mode, Vec::new(), Vec::new(), Vec::new())
    }

    /// Sets the failure threshold for scans.
    #[must_use]
    pub fn with_fail_on(mut self, severity: Severity) -> Self {
        self.fail_on = severity;
        self
    }

    /// Violations grouped by category.
    #[must_use]
    pub fn by_category(&self) -> BTreeMap<Category, Vec<&Violation>> {
        let mut grouped: BTreeMap<Category, Vec<&Violation>> = BTreeMap::new();
        for v in &self.violations {
            grouped.entry(v.category).or_default().push(v);
        }
        grouped
    }

    /// Violations grouped by file.
    #[must_use]
    pub fn by_file(&self) -> BTreeMap<&PathBuf, Vec<&Violation>> {
        let mut grouped: BTreeMap<&PathBuf, Vec<&Violation>> = BTreeMap::new();
        for v in &self.violations {
            grouped.entry(&v.location.file).or_default().push(v);
        }
        grouped
    }

    /// Returns violation counts by severity: (errors, warnings, infos).
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let mut errors = 0;
        let mut warnings = 0;
        let mut infos = 0;

        for v in &self.violations {
            match v.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
                Severity::Info => infos += 1,
            }
        }

        (errors, warnings, infos)
    }

    /// Transformations grouped by file.
    #[must_use]
    pub fn transformations_by_file(&self) -> BTreeMap<&PathBuf, Vec<&Transformation>> {
        let mut grouped: BTreeMap<&PathBuf, Vec<&Transformation>> = BTreeMap::new();
        for t in &self.transformations {
            grouped.entry(&t.file).or_default().push(t);
        }
        grouped
    }

    /// Overall verdict for the run's mode.
    ///
    /// A scan fails on any violation at or above `fail_on`. An import
    /// analysis fails on any cycle. Fix runs fail only when a rewrite could
    /// not be validated or written.
    #[must_use]
    pub fn passed(&self) -> bool {
        match self.mode {
            RunMode::Scan => !self.violations.iter().any(|v| v.severity >= self.fail_on),
            RunMode::AnalyzeImports => self.cycles.is_empty(),
            RunMode::FixDryRun | RunMode::FixApply => !self
                .issues
                .iter()
                .any(|i| matches!(i.kind, IssueKind::Transform | IssueKind::Write)),
        }
    }

    /// Stable summary of the run.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let (errors, warnings, infos) = self.count_by_severity();
        RunSummary {
            mode: self.mode,
            files_checked: self.files_checked,
            violations: self.violations.len(),
            errors,
            warnings,
            infos,
            by_category: self
                .by_category()
                .into_iter()
                .map(|(c, vs)| (c.as_str().to_string(), vs.len()))
                .collect(),
            transformations: self.transformations.len(),
            files_modified: self.files_modified.len(),
            cycles: self.cycles.len(),
            issues: self.issues.len(),
            pure_interfaces: self.pure_interfaces,
            passed: self.passed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;

    fn violation(file: &str, line: usize, category: Category, severity: Severity) -> Violation {
        Violation::new(
            "CL000",
            category.as_str(),
            category,
            severity,
            Location::new(PathBuf::from(file), line, 1),
            "test",
        )
    }

    #[test]
    fn aggregate_sorts_and_groups() {
        let report = aggregate(
            RunMode::Scan,
            vec![
                violation("b.py", 1, Category::VagueNaming, Severity::Info),
                violation("a.py", 9, Category::ForbiddenImport, Severity::Error),
                violation("a.py", 2, Category::ForbiddenImport, Severity::Error),
            ],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(report.violations[0].location.line, 2);
        assert_eq!(report.violations[2].location.file, PathBuf::from("b.py"));
        assert_eq!(report.by_category()[&Category::ForbiddenImport].len(), 2);
        assert_eq!(report.by_file().len(), 2);
        assert_eq!(report.count_by_severity(), (2, 0, 1));
        assert!(!report.passed());
    }

    #[test]
    fn scan_verdict_respects_fail_on() {
        let report = aggregate(
            RunMode::Scan,
            vec![violation("a.py", 1, Category::MissingMarker, Severity::Warning)],
            Vec::new(),
            Vec::new(),
        );
        assert!(report.passed());
        assert!(!report.clone().with_fail_on(Severity::Warning).passed());
    }

    #[test]
    fn import_verdict_depends_only_on_cycles() {
        let mut report = RunReport::new(RunMode::AnalyzeImports);
        report
            .violations
            .push(violation("a.py", 1, Category::ForbiddenImport, Severity::Error));
        assert!(report.passed());
        report
            .cycles
            .push(Cycle::new(vec!["a".into(), "a".into()]));
        assert!(!report.passed());
    }

    #[test]
    fn fix_verdict_ignores_io_issues() {
        let mut report = RunReport::new(RunMode::FixApply);
        report
            .issues
            .push(FileIssue::new(PathBuf::from("a.py"), IssueKind::Io, "denied"));
        assert!(report.passed());
        report.issues.push(FileIssue::new(
            PathBuf::from("b.py"),
            IssueKind::Transform,
            "does not re-parse",
        ));
        assert!(!report.passed());
    }

    #[test]
    fn summary_counts_categories() {
        let report = aggregate(
            RunMode::Scan,
            vec![
                violation("a.py", 1, Category::NamingPattern, Severity::Error),
                violation("a.py", 2, Category::NamingPattern, Severity::Warning),
            ],
            Vec::new(),
            Vec::new(),
        );
        let summary = report.summary();
        assert_eq!(summary.violations, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.by_category.get("naming-pattern"), Some(&2));
        assert!(!summary.passed);
    }
}
