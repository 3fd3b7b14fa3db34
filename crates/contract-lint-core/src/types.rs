//! Core types for violations, transformations and cycles.

use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for lint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            other => Err(format!(
                "unknown severity `{other}`. Valid values: error, warning, info"
            )),
        }
    }
}

/// Category of a violation.
///
/// The first seven variants form the closed set rules may emit. `ParseError`
/// is reserved for the engine when a file cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// A construct that has no place in an interface declaration.
    ForbiddenConstruct,
    /// An import of an implementation-affinity module.
    ForbiddenImport,
    /// A declaration name that breaks the naming convention.
    NamingPattern,
    /// A missing awaitable wrapper or asynchronous marker.
    MissingMarker,
    /// A callable body that does not have the placeholder shape.
    SignatureShape,
    /// A name that repeats information already carried by its context.
    RedundantNaming,
    /// A name drawn from a vocabulary too generic to describe the contract.
    VagueNaming,
    /// The file could not be parsed.
    ParseError,
}

impl Category {
    /// Categories that rule visitors may emit.
    pub const RULE_CATEGORIES: [Self; 7] = [
        Self::ForbiddenConstruct,
        Self::ForbiddenImport,
        Self::NamingPattern,
        Self::MissingMarker,
        Self::SignatureShape,
        Self::RedundantNaming,
        Self::VagueNaming,
    ];

    /// Returns the kebab-case name of this category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ForbiddenConstruct => "forbidden-construct",
            Self::ForbiddenImport => "forbidden-import",
            Self::NamingPattern => "naming-pattern",
            Self::MissingMarker => "missing-marker",
            Self::SignatureShape => "signature-shape",
            Self::RedundantNaming => "redundant-naming",
            Self::VagueNaming => "vague-naming",
            Self::ParseError => "parse-error",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to project root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset in file (for miette integration).
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// A suggested fix for a violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
    /// Optional automatic replacement.
    pub replacement: Option<Replacement>,
}

impl Suggestion {
    /// Creates a new suggestion without automatic fix.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            replacement: None,
        }
    }

    /// Creates a new suggestion with automatic fix.
    #[must_use]
    pub fn with_fix(message: impl Into<String>, replacement: Replacement) -> Self {
        Self {
            message: message.into(),
            replacement: Some(replacement),
        }
    }
}

/// An automatic code replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replacement {
    /// Location to replace.
    pub location: Location,
    /// New text to insert.
    pub new_text: String,
}

impl Replacement {
    /// Creates a new replacement.
    #[must_use]
    pub fn new(location: Location, new_text: impl Into<String>) -> Self {
        Self {
            location,
            new_text: new_text.into(),
        }
    }
}

/// A lint violation found during analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "CL001").
    pub code: String,
    /// Rule name (e.g., "forbidden-construct").
    pub rule: String,
    /// Category of the violation.
    pub category: Category,
    /// Severity of this violation.
    pub severity: Severity,
    /// Primary location of the violation.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// The offending source line, trimmed.
    #[serde(default)]
    pub evidence: String,
    /// Optional suggestion for fixing.
    pub suggestion: Option<Suggestion>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        category: Category,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            category,
            severity,
            location,
            message: message.into(),
            evidence: String::new(),
            suggestion: None,
        }
    }

    /// Creates the violation recorded for a file that failed to parse.
    #[must_use]
    pub fn parse_error(location: Location, message: impl Into<String>) -> Self {
        Self::new(
            "CL000",
            "parse-error",
            Category::ParseError,
            Severity::Error,
            location,
            message,
        )
    }

    /// Attaches the evidence snippet.
    #[must_use]
    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = evidence.into();
        self
    }

    /// Adds a suggestion to this violation.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} {} at {}:{}:{}\n",
            self.code,
            self.rule,
            self.location.file.display(),
            self.location.line,
            self.location.column,
        );
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if !self.evidence.is_empty() {
            let _ = writeln!(output, "  | {}", self.evidence);
        }
        if let Some(suggestion) = &self.suggestion {
            let _ = writeln!(output, "  = help: {}", suggestion.message);
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )
    }
}

/// Converts a Violation to a miette Diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            message: format!("[{}] {}", v.code, v.message),
            help: v.suggestion.as_ref().map(|s| s.message.clone()),
            span: SourceSpan::from((v.location.offset, v.location.length)),
            label_message: v.rule.clone(),
        }
    }
}

/// Kind of source-to-source rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformKind {
    /// `Optional[T]` becomes `T | None`.
    NullableUnion,
    /// `Union[A, B, C]` becomes `A | B | C`.
    MultiArmUnion,
    /// `"Name"` becomes `Name` for names imported under `TYPE_CHECKING`.
    ForwardReference,
    /// Wraps a return type in `Awaitable[...]`, adding `async` and the import when needed.
    AwaitableWrapping,
}

impl TransformKind {
    /// Every transformation kind, in application order.
    pub const ALL: [Self; 4] = [
        Self::NullableUnion,
        Self::MultiArmUnion,
        Self::ForwardReference,
        Self::AwaitableWrapping,
    ];

    /// Returns the kebab-case name of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NullableUnion => "nullable-union",
            Self::MultiArmUnion => "multi-arm-union",
            Self::ForwardReference => "forward-reference",
            Self::AwaitableWrapping => "awaitable-wrapping",
        }
    }
}

impl std::fmt::Display for TransformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransformKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown transformation kind `{s}`"))
    }
}

/// A single text rewrite proposed for a file.
///
/// `start_byte..end_byte` is the replaced range in the original text. The
/// transformations of one file never overlap, so applying them from the
/// highest offset down reproduces the rewritten file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    /// File path relative to project root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// What kind of rewrite this is.
    pub kind: TransformKind,
    /// Text being replaced.
    pub original_text: String,
    /// Text replacing it.
    pub replacement_text: String,
    /// Start of the replaced range (byte offset).
    pub start_byte: usize,
    /// End of the replaced range (byte offset, exclusive).
    pub end_byte: usize,
}

impl Transformation {
    /// Formats the transformation as a diff-style hunk.
    #[must_use]
    pub fn format_diff(&self) -> String {
        use std::fmt::Write;
        let mut out = format!(
            "{}:{}:{} [{}]\n",
            self.file.display(),
            self.line,
            self.column,
            self.kind
        );
        for line in self.original_text.lines() {
            let _ = writeln!(out, "- {line}");
        }
        if self.original_text.is_empty() {
            let _ = writeln!(out, "-");
        }
        for line in self.replacement_text.lines() {
            let _ = writeln!(out, "+ {line}");
        }
        out
    }
}

/// A dependency cycle `[m0, m1, ..., m0]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cycle {
    /// Module identifiers in traversal order, first repeated at the end.
    pub modules: Vec<String>,
}

impl Cycle {
    /// Creates a cycle from a closed path.
    #[must_use]
    pub fn new(modules: Vec<String>) -> Self {
        Self { modules }
    }

    /// Number of distinct modules in the cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len().saturating_sub(1)
    }

    /// Returns true for a degenerate, empty cycle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the module participates in this cycle.
    #[must_use]
    pub fn contains(&self, module: &str) -> bool {
        self.modules.iter().any(|m| m == module)
    }
}

impl std::fmt::Display for Cycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.modules.join(" -> "))
    }
}

/// Kind of per-file failure that did not stop the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// The file could not be read.
    Io,
    /// A rewrite did not re-parse; the file was left untouched.
    Transform,
    /// Backup or write of the rewritten file failed.
    Write,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io => write!(f, "io"),
            Self::Transform => write!(f, "transform"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// A per-file failure recorded in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileIssue {
    /// File path relative to project root.
    pub file: PathBuf,
    /// Failure kind.
    pub kind: IssueKind,
    /// Human-readable cause.
    pub message: String,
}

impl FileIssue {
    /// Creates a new file issue.
    #[must_use]
    pub fn new(file: PathBuf, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            file,
            kind,
            message: message.into(),
        }
    }
}

/// Result of running lint analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations found.
    pub violations: Vec<Violation>,
    /// Files that could not be processed.
    pub issues: Vec<FileIssue>,
    /// Number of files checked.
    pub files_checked: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Returns violations filtered by category.
    #[must_use]
    pub fn by_category(&self, category: Category) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.category == category)
            .collect()
    }

    /// Adds violations from another result.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.issues.extend(other.issues);
        self.files_checked += other.files_checked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation(severity: Severity) -> Violation {
        Violation::new(
            "CL001",
            "forbidden-construct",
            Category::ForbiddenConstruct,
            severity,
            Location::new(PathBuf::from("pkg/protocols.py"), 42, 5),
            "`__init__` in interface declaration",
        )
    }

    #[test]
    fn violation_format_includes_evidence_and_help() {
        let v = make_violation(Severity::Error)
            .with_evidence("def __init__(self) -> None: ...")
            .with_suggestion(Suggestion::new("Remove the initializer"));
        let formatted = v.format();
        assert!(formatted.contains("| def __init__(self) -> None: ..."));
        assert!(formatted.contains("= help: Remove the initializer"));
    }

    #[test]
    fn violation_display_is_single_line() {
        let display = format!("{}", make_violation(Severity::Warning));
        assert_eq!(
            display,
            "pkg/protocols.py:42:5: warning [CL001] `__init__` in interface declaration"
        );
    }

    #[test]
    fn category_serializes_kebab_case() {
        let json = serde_json::to_string(&Category::RedundantNaming).unwrap();
        assert_eq!(json, "\"redundant-naming\"");
        assert!(!Category::RULE_CATEGORIES.contains(&Category::ParseError));
    }

    #[test]
    fn transform_kind_round_trips_through_str() {
        for kind in TransformKind::ALL {
            assert_eq!(kind.as_str().parse::<TransformKind>(), Ok(kind));
        }
        assert!("sort-imports".parse::<TransformKind>().is_err());
    }

    #[test]
    fn transformation_diff_marks_both_sides() {
        let t = Transformation {
            file: PathBuf::from("a.py"),
            line: 3,
            column: 12,
            kind: TransformKind::NullableUnion,
            original_text: "Optional[int]".into(),
            replacement_text: "int | None".into(),
            start_byte: 40,
            end_byte: 53,
        };
        assert_eq!(
            t.format_diff(),
            "a.py:3:12 [nullable-union]\n- Optional[int]\n+ int | None\n"
        );
    }

    #[test]
    fn cycle_len_excludes_closing_node() {
        let c = Cycle::new(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(c.len(), 2);
        assert_eq!(c.to_string(), "a -> b -> a");
        assert!(c.contains("b"));
    }

    #[test]
    fn has_violations_at_respects_threshold() {
        let mut result = LintResult::new();
        result.violations.push(make_violation(Severity::Warning));
        assert!(!result.has_violations_at(Severity::Error));
        assert!(result.has_violations_at(Severity::Warning));
        assert!(!result.has_errors());
    }
}
