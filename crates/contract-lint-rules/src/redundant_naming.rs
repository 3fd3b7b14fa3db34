//! Rule flagging names that repeat what their context already says.
//!
//! # Detected Patterns
//!
//! - `ProtocolProtocolReader`, `ProtocolReaderProtocol`, `ProtocolReaderInterface`
//! - `ProtocolCache.get_cache`, `ProtocolEventBus.publish_event_bus`

use contract_lint_core::tree_sitter::Node;
use contract_lint_core::utils::nodes;
use contract_lint_core::{Category, FileContext, Rule, RuleConfig, Severity, Suggestion, Violation};

use crate::naming::{snake_segments, stem, to_snake};

/// Rule code for redundant-naming.
pub const CODE: &str = "CL006";

/// Rule name for redundant-naming.
pub const NAME: &str = "redundant-naming";

const REDUNDANT_SUFFIXES: &[&str] = &["Protocol", "Interface", "ABC"];

/// Flags interface and method names that restate their context.
#[derive(Debug, Clone)]
pub struct RedundantNaming {
    /// Interface prefix stripped before comparing.
    pub prefix: String,
}

impl Default for RedundantNaming {
    fn default() -> Self {
        Self::new()
    }
}

impl RedundantNaming {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: "Protocol".to_string(),
        }
    }

    /// Creates the rule from its configuration block.
    #[must_use]
    pub fn from_config(config: Option<&RuleConfig>) -> Self {
        let mut rule = Self::new();
        if let Some(config) = config {
            rule.prefix = config.get_str("prefix", &rule.prefix).to_string();
        }
        rule
    }

    fn check_class(&self, class: Node<'_>, ctx: &FileContext<'_>) -> Option<Violation> {
        let name = nodes::name(class, ctx.text());
        let class_stem = stem(name, &self.prefix);
        let repeated = class_stem.starts_with(&self.prefix)
            || REDUNDANT_SUFFIXES
                .iter()
                .any(|s| class_stem.len() > s.len() && class_stem.ends_with(s));
        if !repeated {
            return None;
        }
        let name_node = class.child_by_field_name("name").unwrap_or(class);
        ctx.violation(
            self,
            name_node,
            format!("Interface name `{name}` repeats what the `Protocol` base already says"),
        )
        .map(|v| v.with_suggestion(Suggestion::new("Keep a single prefix and drop the suffix")))
    }

    fn check_method(&self, func: Node<'_>, ctx: &FileContext<'_>) -> Option<Violation> {
        let src = ctx.text();
        let class = nodes::enclosing_class(func).filter(|c| nodes::is_interface(*c, src))?;
        let method = nodes::name(func, src);
        if nodes::is_dunder(method) {
            return None;
        }
        let class_name = nodes::name(class, src);
        let owner = to_snake(stem(class_name, &self.prefix));
        let owner_segments = snake_segments(&owner);
        if owner_segments.is_empty() {
            return None;
        }
        let method_segments = snake_segments(method);
        let contains = method_segments
            .windows(owner_segments.len())
            .any(|w| w == owner_segments.as_slice());
        if !contains {
            return None;
        }
        let name_node = func.child_by_field_name("name").unwrap_or(func);
        ctx.violation(
            self,
            name_node,
            format!("Method `{class_name}.{method}` repeats the interface name `{owner}`"),
        )
        .map(|v| {
            let shorter: Vec<_> = method
                .split('_')
                .filter(|s| !owner_segments.contains(s))
                .collect();
            v.with_suggestion(Suggestion::new(format!(
                "Consider `{}`",
                shorter.join("_").trim_matches('_')
            )))
        })
    }
}

impl Rule for RedundantNaming {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> Category {
        Category::RedundantNaming
    }

    fn description(&self) -> &'static str {
        "Flags interface and method names that restate their context"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["class_definition", "function_definition"]
    }

    fn visit(&self, node: Node<'_>, ctx: &FileContext<'_>) -> Vec<Violation> {
        let found = if node.kind() == "class_definition" {
            if !nodes::is_interface(node, ctx.text()) {
                return Vec::new();
            }
            self.check_class(node, ctx)
        } else {
            self.check_method(node, ctx)
        };
        found.into_iter().collect()
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
            .rule(RedundantNaming::new())
            .build()
            .expect("Failed to build analyzer")
            .check_source(&source)
    }

    #[test]
    fn test_redundant_interface_names() {
        let violations = check_code(
            "class ProtocolReaderProtocol(Protocol): ...\nclass ProtocolProtocolWriter(Protocol): ...\nclass ProtocolSinkInterface(Protocol): ...\nclass ProtocolSource(Protocol): ...\n",
        );
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_method_repeating_interface_stem() {
        let violations = check_code(
            r#"
class ProtocolEventBus(Protocol):
    def publish_event_bus(self) -> None: ...
    def publish(self) -> None: ...
    def bus_event(self) -> None: ...
"#,
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("event_bus"));
        assert_eq!(
            violations[0].suggestion.as_ref().map(|s| s.message.as_str()),
            Some("Consider `publish`")
        );
    }

    #[test]
    fn test_regular_classes_ignored() {
        let violations = check_code("class CacheInterface:\n    def get_cache(self): ...\n");
        assert!(violations.is_empty());
    }
}
