//! Rule enforcing interface and exception naming conventions.
//!
//! # Detected Patterns
//!
//! - `Protocol` classes whose name lacks the `Protocol` prefix (error)
//! - `Protocol` classes without `@runtime_checkable` (warning)
//! - Exception classes whose name lacks the `Error` suffix (error)
//!
//! # Configuration
//!
//! - `prefix`: required interface prefix (default `Protocol`)
//! - `suffix`: required exception suffix (default `Error`)
//! - `require_runtime_checkable`: report missing marker (default `true`)

use contract_lint_core::tree_sitter::Node;
use contract_lint_core::utils::nodes;
use contract_lint_core::{Category, FileContext, Rule, RuleConfig, Severity, Suggestion, Violation};

/// Rule code for naming-pattern.
pub const CODE: &str = "CL003";

/// Rule name for naming-pattern.
pub const NAME: &str = "naming-pattern";

/// Enforces interface prefixes, exception suffixes and the runtime marker.
#[derive(Debug, Clone)]
pub struct NamingPattern {
    /// Required interface name prefix.
    pub prefix: String,
    /// Required exception name suffix.
    pub suffix: String,
    /// Whether a missing `@runtime_checkable` is reported.
    pub require_runtime_checkable: bool,
}

impl Default for NamingPattern {
    fn default() -> Self {
        Self::new()
    }
}

impl NamingPattern {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: "Protocol".to_string(),
            suffix: "Error".to_string(),
            require_runtime_checkable: true,
        }
    }

    /// Creates the rule from its configuration block.
    #[must_use]
    pub fn from_config(config: Option<&RuleConfig>) -> Self {
        let mut rule = Self::new();
        if let Some(config) = config {
            rule.prefix = config.get_str("prefix", &rule.prefix).to_string();
            rule.suffix = config.get_str("suffix", &rule.suffix).to_string();
            rule.require_runtime_checkable =
                config.get_bool("require_runtime_checkable", rule.require_runtime_checkable);
        }
        rule
    }

    fn check_interface(&self, class: Node<'_>, name: &str, ctx: &FileContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        let name_node = class.child_by_field_name("name").unwrap_or(class);

        if !name.starts_with(&self.prefix) || name.len() == self.prefix.len() {
            violations.extend(
                ctx.violation(
                    self,
                    name_node,
                    format!("Interface `{name}` should be named `{}<Name>`", self.prefix),
                )
                .map(|v| {
                    v.with_suggestion(Suggestion::new(format!(
                        "Rename to `{}{}`",
                        self.prefix,
                        name.trim_end_matches(&self.prefix)
                    )))
                }),
            );
        }

        if self.require_runtime_checkable && !nodes::has_decorator(class, ctx.text(), "runtime_checkable")
        {
            violations.extend(
                ctx.violation_at(
                    self,
                    name_node,
                    Severity::Warning,
                    format!("Interface `{name}` is missing `@runtime_checkable`"),
                )
                .map(|v| {
                    v.with_suggestion(Suggestion::new(
                        "Add `@runtime_checkable` so isinstance() checks work against the contract",
                    ))
                }),
            );
        }

        violations
    }
}

impl Rule for NamingPattern {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> Category {
        Category::NamingPattern
    }

    fn description(&self) -> &'static str {
        "Requires interface prefixes, exception suffixes and @runtime_checkable"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["class_definition"]
    }

    fn visit(&self, node: Node<'_>, ctx: &FileContext<'_>) -> Vec<Violation> {
        let src = ctx.text();
        let name = nodes::name(node, src);

        if nodes::is_interface(node, src) {
            return self.check_interface(node, name, ctx);
        }

        if nodes::is_exception_class(node, src) && !name.ends_with(&self.suffix) {
            let name_node = node.child_by_field_name("name").unwrap_or(node);
            return ctx
                .violation(
                    self,
                    name_node,
                    format!("Exception `{name}` should end with `{}`", self.suffix),
                )
                .map(|v| {
                    v.with_suggestion(Suggestion::new(format!(
                        "Rename to `{}{}`",
                        name.trim_end_matches("Exception"),
                        self.suffix
                    )))
                })
                .into_iter()
                .collect();
        }

        Vec::new()
    }
}
