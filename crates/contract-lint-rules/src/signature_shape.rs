//! Rule requiring the placeholder body shape on interface methods.
//!
//! An interface method body is either `...` alone or a docstring followed by
//! `...`. Bodies with executable statements are reported by
//! `forbidden-construct`; this rule covers the inert-but-malformed rest:
//! docstring-only bodies, doubled placeholders, a placeholder before the
//! docstring and `raise NotImplementedError`.

use contract_lint_core::tree_sitter::Node;
use contract_lint_core::utils::nodes;
use contract_lint_core::{Category, FileContext, Rule, Severity, Suggestion, Violation};

/// Rule code for signature-shape.
pub const CODE: &str = "CL005";

/// Rule name for signature-shape.
pub const NAME: &str = "signature-shape";

/// Flags interface method bodies that are not a lone placeholder.
#[derive(Debug, Clone, Default)]
pub struct SignatureShape;

impl SignatureShape {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn describe(stmts: &[Node<'_>], src: &str) -> &'static str {
    if stmts.iter().any(|s| nodes::is_not_implemented(*s, src)) {
        "raises NotImplementedError instead of using `...`"
    } else if stmts.iter().all(|s| nodes::is_docstring(*s)) {
        "has documentation but no placeholder"
    } else if stmts.len() > 1 && stmts.iter().all(|s| nodes::is_placeholder(*s)) {
        "repeats the placeholder"
    } else {
        "should be `...`, optionally preceded by a docstring"
    }
}

impl Rule for SignatureShape {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> Category {
        Category::SignatureShape
    }

    fn description(&self) -> &'static str {
        "Requires interface method bodies to be `...` or docstring + `...`"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["function_definition"]
    }

    fn visit(&self, node: Node<'_>, ctx: &FileContext<'_>) -> Vec<Violation> {
        let src = ctx.text();
        let name = nodes::name(node, src);
        if name == "__init__"
            || !nodes::enclosing_class(node).is_some_and(|c| nodes::is_interface(c, src))
            || nodes::has_placeholder_body(node)
        {
            return Vec::new();
        }

        let Some(block) = nodes::body(node) else {
            return Vec::new();
        };
        let stmts = nodes::statements(block);
        if stmts.iter().any(|s| nodes::is_executable(*s, src)) {
            return Vec::new();
        }

        let name_node = node.child_by_field_name("name").unwrap_or(node);
        ctx.violation(
            self,
            name_node,
            format!("Body of interface method `{name}` {}", describe(&stmts, src)),
        )
        .map(|v| v.with_suggestion(Suggestion::new("Use `...` as the only statement after the docstring")))
        .into_iter()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract_lint_core::{Analyzer, SourceFile};

    fn check_code(code: &str) -> Vec<Violation> {
        let source = SourceFile::parse("test.py", code).expect("Failed to parse");
        Analyzer::builder()
            .root(".")
            .rule(SignatureShape::new())
            .build()
            .expect("Failed to build analyzer")
            .check_source(&source)
    }

    #[test]
    fn test_canonical_shapes_pass() {
        let violations = check_code(
            r#"
class ProtocolA(Protocol):
    def a(self) -> int: ...

    def b(self) -> int:
        """Doc."""
        ...

    def c(self) -> int:
        pass
"#,
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_malformed_shapes() {
        let violations = check_code(
            r#"
class ProtocolA(Protocol):
    def doc_only(self) -> int:
        """Doc."""

    def doubled(self) -> int:
        ...
        ...

    def raises(self) -> int:
        raise NotImplementedError("abstract")
"#,
        );
        assert_eq!(violations.len(), 3);
        assert!(violations[0].message.contains("no placeholder"));
        assert!(violations[1].message.contains("repeats"));
        assert!(violations[2].message.contains("NotImplementedError"));
    }

    #[test]
    fn test_executable_bodies_left_to_forbidden_construct() {
        let violations = check_code(
            "class ProtocolA(Protocol):\n    def a(self) -> int:\n        return 1\n",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_non_interface_methods_ignored() {
        let violations = check_code("class A:\n    def a(self) -> int:\n        \"\"\"Doc.\"\"\"\n");
        assert!(violations.is_empty());
    }
}
