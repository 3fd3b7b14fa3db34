//! Rule flagging names drawn from a vocabulary too generic to describe a contract.

use contract_lint_core::tree_sitter::Node;
use contract_lint_core::utils::nodes;
use contract_lint_core::{Category, FileContext, Rule, RuleConfig, Severity, Suggestion, Violation};

use crate::naming::{camel_words, snake_segments, stem};

/// Rule code for vague-naming.
pub const CODE: &str = "CL007";

/// Rule name for vague-naming.
pub const NAME: &str = "vague-naming";

/// Words that say nothing about an interface's role.
pub const VAGUE_TYPE_WORDS: &[&str] = &[
    "Manager", "Handler", "Helper", "Util", "Utils", "Data", "Info", "Processor", "Thing",
    "Stuff", "Misc", "Common", "Base",
];

/// Words that say nothing about a callable's effect.
pub const VAGUE_CALLABLE_WORDS: &[&str] = &[
    "process", "handle", "do", "run", "execute", "manage", "perform", "data", "stuff", "thing",
    "misc",
];

/// Flags interfaces ending in a vague word and callables named only with vague words.
#[derive(Debug, Clone)]
pub struct VagueNaming {
    /// Interface prefix stripped before inspecting the name.
    pub prefix: String,
    /// Vague interface words.
    pub type_words: Vec<String>,
    /// Vague callable words.
    pub callable_words: Vec<String>,
}

impl Default for VagueNaming {
    fn default() -> Self {
        Self::new()
    }
}

impl VagueNaming {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: "Protocol".to_string(),
            type_words: VAGUE_TYPE_WORDS.iter().map(|s| (*s).to_string()).collect(),
            callable_words: VAGUE_CALLABLE_WORDS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Creates the rule from its configuration block.
    #[must_use]
    pub fn from_config(config: Option<&RuleConfig>) -> Self {
        let mut rule = Self::new();
        if let Some(config) = config {
            rule.prefix = config.get_str("prefix", &rule.prefix).to_string();
            if let Some(words) = config.get_str_array("type_words") {
                rule.type_words = words;
            }
            if let Some(words) = config.get_str_array("callable_words") {
                rule.callable_words = words;
            }
        }
        rule
    }

    fn vague_type_word<'n>(&self, name: &'n str) -> Option<&'n str> {
        camel_words(stem(name, &self.prefix))
            .last()
            .copied()
            .filter(|w| self.type_words.iter().any(|t| t == w))
    }

    fn is_vague_callable(&self, name: &str) -> bool {
        let segments = snake_segments(name);
        !segments.is_empty()
            && segments
                .iter()
                .all(|s| self.callable_words.iter().any(|w| w == s))
    }
}

impl Rule for VagueNaming {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> Category {
        Category::VagueNaming
    }

    fn description(&self) -> &'static str {
        "Flags generic names such as *Manager or process()"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["class_definition", "function_definition"]
    }

    fn visit(&self, node: Node<'_>, ctx: &FileContext<'_>) -> Vec<Violation> {
        let src = ctx.text();
        let name = nodes::name(node, src);
        let name_node = node.child_by_field_name("name").unwrap_or(node);

        let message = if node.kind() == "class_definition" {
            if !nodes::is_interface(node, src) {
                return Vec::new();
            }
            let Some(word) = self.vague_type_word(name) else {
                return Vec::new();
            };
            format!("Interface `{name}` ends in the vague word `{word}`")
        } else {
            let in_interface = nodes::enclosing_class(node).is_some_and(|c| nodes::is_interface(c, src));
            if !in_interface || nodes::is_dunder(name) || !self.is_vague_callable(name) {
                return Vec::new();
            }
            format!("Method name `{name}` does not say what it does")
        };

        ctx.violation(self, name_node, message)
            .map(|v| v.with_suggestion(Suggestion::new("Name the role or effect explicitly")))
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
            .rule(VagueNaming::new())
            .build()
            .expect("Failed to build analyzer")
            .check_source(&source)
    }

    #[test]
    fn test_vague_interface_names() {
        let violations = check_code(
            "class ProtocolSessionManager(Protocol): ...\nclass ProtocolBase(Protocol): ...\nclass ProtocolClock(Protocol): ...\nclass DataManager: ...\n",
        );
        assert_eq!(violations.len(), 2);
        assert!(violations[0].message.contains("`Manager`"));
        assert!(violations[1].message.contains("`Base`"));
        assert!(violations.iter().all(|v| v.severity == Severity::Info));
    }

    #[test]
    fn test_vague_method_names() {
        let violations = check_code(
            r#"
class ProtocolJob(Protocol):
    def run(self) -> None: ...
    def handle_data(self) -> None: ...
    def process_payment(self) -> None: ...
    def __call__(self) -> None: ...
"#,
        );
        assert_eq!(violations.len(), 2);
        assert!(violations[0].message.contains("`run`"));
        assert!(violations[1].message.contains("`handle_data`"));
    }
}
