//! Rule requiring the awaitable convention on asynchronous callables.
//!
//! # Detected Patterns
//!
//! - `async def f(...) -> X` where `X` is not `Awaitable[...]`
//! - Synchronous interface methods named after I/O (`read_*`, `fetch_*`,
//!   `send_*`, ...) that are expected to be asynchronous
//!
//! # Allowed Patterns
//!
//! - Return types in `exempt_return_types` (`AsyncIterator`, `Coroutine`, ...)
//! - Dunder methods and properties
//!
//! # Configuration
//!
//! - `io_verbs`: first name segments that mark an I/O callable
//! - `exempt_return_types`: return heads that already express asynchrony
//!
//! # Suppression
//!
//! A callable whose return value already represents a pending computation
//! can opt out with
//! `# contract-lint: allow(missing-marker) reason="..."`.

use contract_lint_core::tree_sitter::Node;
use contract_lint_core::utils::nodes;
use contract_lint_core::{
    Category, FileContext, Replacement, Rule, RuleConfig, Severity, Suggestion, Violation,
};

use crate::naming::snake_segments;

/// Rule code for missing-marker.
pub const CODE: &str = "CL004";

/// Rule name for missing-marker.
pub const NAME: &str = "missing-marker";

/// Name of the awaitable wrapper.
pub const AWAITABLE: &str = "Awaitable";

/// First name segments that mark an I/O callable.
pub const DEFAULT_IO_VERBS: &[&str] = &[
    "read",
    "write",
    "fetch",
    "send",
    "receive",
    "recv",
    "load",
    "save",
    "store",
    "persist",
    "publish",
    "subscribe",
    "connect",
    "disconnect",
    "upload",
    "download",
    "request",
    "query",
    "flush",
    "stream",
];

/// Return heads that already express asynchrony.
pub const DEFAULT_EXEMPT_RETURN_TYPES: &[&str] =
    &["AsyncIterator", "AsyncIterable", "AsyncGenerator", "Coroutine"];

/// Flags async callables without the awaitable wrapper and sync I/O callables.
#[derive(Debug, Clone)]
pub struct MissingMarker {
    /// I/O vocabulary matched against the first name segment.
    pub io_verbs: Vec<String>,
    /// Return heads that need no wrapper.
    pub exempt_return_types: Vec<String>,
}

impl Default for MissingMarker {
    fn default() -> Self {
        Self::new()
    }
}

impl MissingMarker {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            io_verbs: DEFAULT_IO_VERBS.iter().map(|s| (*s).to_string()).collect(),
            exempt_return_types: DEFAULT_EXEMPT_RETURN_TYPES
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
            if let Some(verbs) = config.get_str_array("io_verbs") {
                rule.io_verbs = verbs;
            }
            if let Some(types) = config.get_str_array("exempt_return_types") {
                rule.exempt_return_types = types;
            }
        }
        rule
    }

    /// True if the return annotation needs no wrapper.
    #[must_use]
    pub fn is_wrapped(&self, return_type: Node<'_>, src: &str) -> bool {
        let head = nodes::last_segment(nodes::type_head(return_type, src));
        head == AWAITABLE || self.exempt_return_types.iter().any(|t| t == head)
    }

    /// True if the name starts with an I/O verb.
    #[must_use]
    pub fn is_io_name(&self, name: &str) -> bool {
        snake_segments(name)
            .first()
            .is_some_and(|first| self.io_verbs.iter().any(|v| v == first))
    }

    /// True for a synchronous interface method expected to be async.
    #[must_use]
    pub fn is_sync_io_method(&self, func: Node<'_>, src: &str) -> bool {
        let name = nodes::name(func, src);
        !nodes::is_async(func)
            && !nodes::is_dunder(name)
            && !nodes::is_property(func, src)
            && self.is_io_name(name)
            && nodes::enclosing_class(func).is_some_and(|c| nodes::is_interface(c, src))
            && func
                .child_by_field_name("return_type")
                .map_or(true, |r| !self.is_wrapped(r, src))
    }
}

impl Rule for MissingMarker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> Category {
        Category::MissingMarker
    }

    fn description(&self) -> &'static str {
        "Requires Awaitable[...] on async callables and async on I/O-named methods"
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
        let return_type = node.child_by_field_name("return_type");

        if nodes::is_async(node) {
            let Some(return_type) = return_type.filter(|r| !self.is_wrapped(*r, src)) else {
                return Vec::new();
            };
            let declared = nodes::text(return_type, src);
            let wrapped = format!("{AWAITABLE}[{declared}]");
            return ctx
                .violation(
                    self,
                    return_type,
                    format!("Async callable `{name}` returns `{declared}` without the awaitable wrapper"),
                )
                .map(|v| {
                    let replacement = Replacement::new(ctx.location(return_type), wrapped.clone());
                    v.with_suggestion(Suggestion::with_fix(
                        format!("Declare the return type as `{wrapped}`"),
                        replacement,
                    ))
                })
                .into_iter()
                .collect();
        }

        if !self.is_sync_io_method(node, src) {
            return Vec::new();
        }
        let declared = return_type.map_or("None", |r| nodes::text(r, src));
        let name_node = node.child_by_field_name("name").unwrap_or(node);
        ctx.violation(
            self,
            name_node,
            format!("I/O callable `{name}` is declared synchronous"),
        )
        .map(|v| {
            v.with_suggestion(Suggestion::new(format!(
                "Declare as `async def {name}(...) -> {AWAITABLE}[{declared}]`"
            )))
        })
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
            .rule(MissingMarker::new())
            .build()
            .expect("Failed to build analyzer")
            .check_source(&source)
    }

    #[test]
    fn test_async_without_wrapper_suggests_awaitable() {
        let violations = check_code(
            "class ProtocolRepo(Protocol):\n    async def get(self, key: str) -> dict[str, int]: ...\n",
        );
        assert_eq!(violations.len(), 1);
        let suggestion = violations[0].suggestion.as_ref().unwrap();
        assert!(suggestion.message.contains("Awaitable[dict[str, int]]"));
        assert_eq!(
            suggestion.replacement.as_ref().map(|r| r.new_text.as_str()),
            Some("Awaitable[dict[str, int]]")
        );
    }

    #[test]
    fn test_wrapped_and_exempt_returns_pass() {
        let violations = check_code(
            r#"
async def a() -> Awaitable[int]: ...
async def b() -> typing.Awaitable[int]: ...
async def c() -> AsyncIterator[bytes]: ...
async def d(): ...
"#,
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_sync_io_methods_in_interfaces() {
        let violations = check_code(
            r#"
class ProtocolChannel(Protocol):
    def send_message(self, body: bytes) -> None: ...
    def fetch(self) -> Awaitable[bytes]: ...
    def reader_count(self) -> int: ...
    def __read__(self) -> int: ...

    @property
    def stream(self) -> bytes: ...

def read_config() -> dict: ...
"#,
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("send_message"));
        assert!(violations[0]
            .suggestion
            .as_ref()
            .unwrap()
            .message
            .contains("Awaitable[None]"));
    }

    #[test]
    fn test_allow_comment_opts_out() {
        let violations = check_code(
            "class ProtocolRepo(Protocol):\n    # contract-lint: allow(missing-marker) reason=\"returns a Future\"\n    async def get(self) -> Future[int]: ...\n",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_configured_verbs() {
        let config: RuleConfig = toml::from_str("io_verbs = [\"emit\"]").unwrap();
        let source = SourceFile::parse(
            "test.py",
            "class ProtocolBus(Protocol):\n    def emit(self) -> None: ...\n    def send(self) -> None: ...\n",
        )
        .unwrap();
        let violations = Analyzer::builder()
            .root(".")
            .rule(MissingMarker::from_config(Some(&config)))
            .build()
            .unwrap()
            .check_source(&source);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("emit"));
    }
}
