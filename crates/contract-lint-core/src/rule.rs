//! Rule trait for defining lint rules.

use crate::context::FileContext;
use crate::types::{Category, Severity, Violation};
use tree_sitter::Node;

/// A per-file lint rule over the Python syntax tree.
///
/// Rules do not walk the tree themselves. The [`Analyzer`](crate::Analyzer)
/// performs a single walk per file and hands every node whose kind is listed
/// in [`Rule::node_kinds`] to [`Rule::visit`]. Rules hold no state across
/// files.
///
/// # Example
///
/// ```ignore
/// use contract_lint_core::{Category, FileContext, Rule, Violation};
/// use tree_sitter::Node;
///
/// pub struct NoGlobalStatements;
///
/// impl Rule for NoGlobalStatements {
///     fn name(&self) -> &'static str { "no-global-statements" }
///     fn code(&self) -> &'static str { "CL900" }
///     fn category(&self) -> Category { Category::ForbiddenConstruct }
///     fn node_kinds(&self) -> &'static [&'static str] { &["global_statement"] }
///
///     fn visit(&self, node: Node<'_>, ctx: &FileContext<'_>) -> Vec<Violation> {
///         ctx.violation(self, node, "`global` in interface module")
///             .into_iter()
///             .collect()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "forbidden-import").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "CL002").
    fn code(&self) -> &'static str;

    /// Returns the category every violation of this rule carries.
    fn category(&self) -> Category;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether this rule requires a reason when using allow directives.
    ///
    /// By default, rules with `Severity::Error` require a reason.
    fn requires_allow_reason(&self) -> bool {
        self.default_severity() == Severity::Error
    }

    /// Node kinds this rule wants to see during the walk.
    fn node_kinds(&self) -> &'static [&'static str];

    /// Inspects one node and returns any violations found.
    ///
    /// Violations must be created through [`FileContext::violation`] so that
    /// nothing is reported inside a documentation span.
    fn visit(&self, node: Node<'_>, ctx: &FileContext<'_>) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceFile;
    use std::path::Path;

    struct PassStatements;

    impl Rule for PassStatements {
        fn name(&self) -> &'static str {
            "test-rule"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn category(&self) -> Category {
            Category::SignatureShape
        }
        fn default_severity(&self) -> Severity {
            Severity::Info
        }
        fn node_kinds(&self) -> &'static [&'static str] {
            &["pass_statement"]
        }
        fn visit(&self, node: Node<'_>, ctx: &FileContext<'_>) -> Vec<Violation> {
            ctx.violation(self, node, "pass").into_iter().collect()
        }
    }

    #[test]
    fn rule_defaults_follow_severity() {
        let rule = PassStatements;
        assert_eq!(rule.name(), "test-rule");
        assert_eq!(rule.code(), "TEST001");
        assert!(!rule.requires_allow_reason());
    }

    #[test]
    fn rule_visit_builds_located_violation() {
        let source = SourceFile::parse("m.py", "def f():\n    pass\n").unwrap();
        let ctx = FileContext::new(&source, Path::new(""));
        let root = source.tree().root_node();
        let pass = root
            .named_child(0)
            .and_then(|f| f.child_by_field_name("body"))
            .and_then(|b| b.named_child(0))
            .unwrap();
        let violations = PassStatements.visit(pass, &ctx);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 2);
        assert_eq!(violations[0].location.column, 5);
        assert_eq!(violations[0].evidence, "pass");
    }
}
