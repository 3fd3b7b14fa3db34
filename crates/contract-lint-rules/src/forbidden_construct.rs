//! Rule to forbid implementation constructs inside interface declarations.
//!
//! # Rationale
//!
//! A `Protocol` class describes a shape. Constructors, real method bodies and
//! baked-in default values turn it into a half-implementation that every
//! structural match silently depends on.
//!
//! # Detected Patterns
//!
//! - `__init__` declared in a `Protocol` class (its body is not inspected)
//! - A method body containing executable statements
//! - A default argument that is a literal constant (`timeout: int = 30`)
//!
//! # Allowed Patterns
//!
//! - `None` and `...` as defaults
//! - Docstrings, `...`, `pass` and `raise NotImplementedError` in bodies
//!
//! # Suppression
//!
//! - `# contract-lint: allow(forbidden-construct) reason="..."` comment

use contract_lint_core::tree_sitter::Node;
use contract_lint_core::utils::nodes;
use contract_lint_core::{Category, FileContext, Rule, Severity, Suggestion, Violation};

/// Rule code for forbidden-construct.
pub const CODE: &str = "CL001";

/// Rule name for forbidden-construct.
pub const NAME: &str = "forbidden-construct";

/// Forbids initializers, concrete bodies and literal defaults in interfaces.
#[derive(Debug, Clone)]
pub struct ForbiddenConstruct {
    /// Whether literal default values are reported.
    pub check_defaults: bool,
}

impl Default for ForbiddenConstruct {
    fn default() -> Self {
        Self::new()
    }
}

impl ForbiddenConstruct {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            check_defaults: true,
        }
    }

    /// Sets whether literal defaults are reported.
    #[must_use]
    pub fn check_defaults(mut self, check: bool) -> Self {
        self.check_defaults = check;
        self
    }

    fn check_defaults_of(&self, func: Node<'_>, ctx: &FileContext<'_>, out: &mut Vec<Violation>) {
        let Some(params) = func.child_by_field_name("parameters") else {
            return;
        };
        for param in nodes::named_children(params) {
            if !matches!(param.kind(), "default_parameter" | "typed_default_parameter") {
                continue;
            }
            let Some(value) = param.child_by_field_name("value") else {
                continue;
            };
            if !is_literal_constant(value) {
                continue;
            }
            let param_name = param
                .child_by_field_name("name")
                .map_or("?", |n| nodes::text(n, ctx.text()));
            let message = format!(
                "Hard-coded default `{param_name}={}` in interface method `{}`",
                nodes::text(value, ctx.text()),
                nodes::name(func, ctx.text())
            );
            out.extend(ctx.violation(self, value, message).map(|v| {
                v.with_suggestion(Suggestion::new(
                    "Leave defaults to implementations, or declare the parameter as `... = ...`",
                ))
            }));
        }
    }
}

/// True for literal constants: numbers, strings, booleans, literal
/// containers and negated numbers.
fn is_literal_constant(value: Node<'_>) -> bool {
    match value.kind() {
        "integer" | "float" | "string" | "concatenated_string" | "true" | "false" | "list"
        | "tuple" | "dictionary" | "set" => true,
        "unary_operator" => value
            .child_by_field_name("argument")
            .is_some_and(|a| matches!(a.kind(), "integer" | "float")),
        _ => false,
    }
}

impl Rule for ForbiddenConstruct {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> Category {
        Category::ForbiddenConstruct
    }

    fn description(&self) -> &'static str {
        "Forbids initializers, concrete bodies and literal defaults in Protocol classes"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["function_definition"]
    }

    fn visit(&self, node: Node<'_>, ctx: &FileContext<'_>) -> Vec<Violation> {
        let src = ctx.text();
        let Some(class) = nodes::enclosing_class(node).filter(|c| nodes::is_interface(*c, src))
        else {
            return Vec::new();
        };
        let class_name = nodes::name(class, src);
        let func_name = nodes::name(node, src);
        let mut violations = Vec::new();

        if func_name == "__init__" {
            violations.extend(
                ctx.violation(
                    self,
                    node,
                    format!("`__init__` declared in interface `{class_name}`"),
                )
                .map(|v| {
                    v.with_suggestion(Suggestion::new(
                        "Remove the initializer; construction belongs to implementations",
                    ))
                }),
            );
            return violations;
        }

        if let Some(stmt) = nodes::body(node)
            .map(nodes::statements)
            .and_then(|stmts| stmts.into_iter().find(|s| nodes::is_executable(*s, src)))
        {
            violations.extend(
                ctx.violation(
                    self,
                    stmt,
                    format!("Concrete body in interface method `{class_name}.{func_name}`"),
                )
                .map(|v| v.with_suggestion(Suggestion::new("Replace the body with `...`"))),
            );
        }

        if self.check_defaults {
            self.check_defaults_of(node, ctx, &mut violations);
        }

        violations
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
            .rule(ForbiddenConstruct::new())
            .build()
            .expect("Failed to build analyzer")
            .check_source(&source)
    }

    #[test]
    fn test_initializer_and_literal_default_yield_two() {
        let violations = check_code(
            r#"
class ProtocolClient(Protocol):
    def __init__(self, retries: int = 3) -> None:
        self.retries = retries

    def call(self, timeout: float = 30.0) -> bytes: ...
"#,
        );
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.code == CODE));
        assert_eq!(violations[0].location.line, 3);
        assert!(violations[0].message.contains("__init__"));
        assert_eq!(violations[1].location.line, 6);
        assert!(violations[1].message.contains("timeout=30.0"));
    }

    #[test]
    fn test_concrete_body_reported_once() {
        let violations = check_code(
            r#"
class ProtocolClock(Protocol):
    def now(self) -> int:
        """Current time."""
        value = 1
        return value
"#,
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 5);
        assert_eq!(violations[0].evidence, "value = 1");
    }

    #[test]
    fn test_none_ellipsis_and_negative_defaults() {
        let violations = check_code(
            r#"
class ProtocolQueue(Protocol):
    def get(self, block: bool | None = None, timeout: float = ...) -> bytes: ...
    def put(self, item: bytes, priority: int = -1) -> None: ...
"#,
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("priority=-1"));
    }

    #[test]
    fn test_inert_bodies_are_fine() {
        let violations = check_code(
            r#"
class ProtocolSink(Protocol):
    def write(self, data: bytes) -> None:
        raise NotImplementedError

    def close(self) -> None:
        pass
"#,
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_ignores_regular_classes_and_functions() {
        let violations = check_code(
            r#"
class Client:
    def __init__(self, retries: int = 3) -> None:
        self.retries = retries

def helper(x: int = 1) -> int:
    return x
"#,
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_documented_example_is_not_reported() {
        let violations = check_code(
            r#"
class ProtocolStore(Protocol):
    """Store.

    class Impl:
        def __init__(self, size: int = 10):
            self.size = size
    """

    def get(self, key: str) -> bytes: ...
"#,
        );
        assert!(violations.is_empty());
    }
}
