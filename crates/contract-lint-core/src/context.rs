//! Context types for rule execution.

use crate::rule::Rule;
use crate::source::SourceFile;
use crate::types::{Location, Severity, Violation};
use crate::utils::nodes;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// Context provided to per-file rules.
///
/// Wraps the classified source file together with path metadata rules can
/// use to make context-aware decisions (e.g., path-based exemptions).
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// The parsed and classified file.
    pub source: &'a SourceFile,
    /// Whether this file is detected as a test file.
    pub is_test: bool,
    /// Dotted module identifier (e.g., `pkg.sub.mod`).
    pub module_id: String,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(source: &'a SourceFile, root: &Path) -> Self {
        let path = source.path();
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);
        Self {
            source,
            is_test: detect_test_file(&relative_path),
            module_id: module_id(&relative_path),
            relative_path,
        }
    }

    /// File text.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.source.text()
    }

    /// File name without directories.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.relative_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }

    /// Location of a node, including its byte span.
    #[must_use]
    pub fn location(&self, node: Node<'_>) -> Location {
        Location::new(
            self.relative_path.clone(),
            nodes::line(node),
            nodes::column(node),
        )
        .with_span(node.start_byte(), node.end_byte() - node.start_byte())
    }

    /// Creates a violation for `node` at the rule's default severity.
    ///
    /// Returns `None` when the node starts inside a documentation span, so a
    /// rule cannot report anything there.
    #[must_use]
    pub fn violation<R: Rule + ?Sized>(
        &self,
        rule: &R,
        node: Node<'_>,
        message: impl Into<String>,
    ) -> Option<Violation> {
        self.violation_at(rule, node, rule.default_severity(), message)
    }

    /// Creates a violation for `node` with an explicit severity.
    #[must_use]
    pub fn violation_at<R: Rule + ?Sized>(
        &self,
        rule: &R,
        node: Node<'_>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Option<Violation> {
        let line = nodes::line(node);
        if self.source.in_doc_span(line) {
            return None;
        }
        Some(
            Violation::new(
                rule.code(),
                rule.name(),
                rule.category(),
                severity,
                self.location(node),
                message,
            )
            .with_evidence(self.source.line_text(line)),
        )
    }
}

/// Detects if a file is a test file based on path conventions.
#[must_use]
pub fn detect_test_file(path: &Path) -> bool {
    for component in path.components() {
        if let std::path::Component::Normal(s) = component {
            let s = s.to_string_lossy();
            if s == "tests" || s == "test" {
                return true;
            }
        }
    }

    if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
        if file_name.ends_with("_test.py")
            || file_name.starts_with("test_")
            || file_name == "conftest.py"
        {
            return true;
        }
    }

    false
}

/// Computes the dotted module identifier of a path relative to the root.
///
/// `pkg/sub/mod.py` becomes `pkg.sub.mod` and `pkg/__init__.py` becomes `pkg`.
#[must_use]
pub fn module_id(relative_path: &Path) -> String {
    let mut parts: Vec<String> = relative_path
        .with_extension("")
        .components()
        .filter_map(|c| {
            if let std::path::Component::Normal(s) = c {
                s.to_str().map(String::from)
            } else {
                None
            }
        })
        .collect();

    if parts.last().is_some_and(|last| last == "__init__") {
        parts.pop();
    }

    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_test_file() {
        assert!(detect_test_file(Path::new("pkg/tests/foo.py")));
        assert!(detect_test_file(Path::new("test/integration.py")));
        assert!(detect_test_file(Path::new("pkg/foo_test.py")));
        assert!(detect_test_file(Path::new("pkg/test_foo.py")));
        assert!(detect_test_file(Path::new("conftest.py")));
        assert!(!detect_test_file(Path::new("pkg/testing_protocols.py")));
    }

    #[test]
    fn test_module_id() {
        assert_eq!(module_id(Path::new("pkg/sub/mod.py")), "pkg.sub.mod");
        assert_eq!(module_id(Path::new("pkg/__init__.py")), "pkg");
        assert_eq!(module_id(Path::new("top.py")), "top");
    }

    #[test]
    fn context_strips_root() {
        let source = SourceFile::parse("/repo/pkg/a.py", "x = 1\n").unwrap();
        let ctx = FileContext::new(&source, Path::new("/repo"));
        assert_eq!(ctx.relative_path, PathBuf::from("pkg/a.py"));
        assert_eq!(ctx.module_id, "pkg.a");
        assert_eq!(ctx.file_name(), "a.py");
        assert!(!ctx.is_test);
    }
}
