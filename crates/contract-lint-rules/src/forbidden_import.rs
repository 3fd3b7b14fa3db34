//! Rule to forbid implementation-affinity imports in interface files.
//!
//! # Rationale
//!
//! Interface modules should only need typing constructs. Importing I/O,
//! process, serialization, logging or networking libraries is a sign that
//! implementation detail has leaked into the contract.
//!
//! # Detected Patterns
//!
//! - `import os`, `import os.path as p`
//! - `from json import loads`
//!
//! # Allowed Patterns
//!
//! - Relative imports (`from .types import X`)
//! - Imports inside `if TYPE_CHECKING:`
//! - `datetime` in `core_types.py` (see `exempt_file` / `exempt_modules`)
//!
//! # Configuration
//!
//! - `denylist`: modules to forbid (replaces the default list)
//! - `exempt_file`: file name allowed to import `exempt_modules`
//! - `exempt_modules`: modules the exempt file may import
//!
//! # Suppression
//!
//! - `# contract-lint: allow(forbidden-import) reason="..."` comment

use contract_lint_core::tree_sitter::Node;
use contract_lint_core::utils::{module_matches, nodes};
use contract_lint_core::{Category, FileContext, Rule, RuleConfig, Severity, Suggestion, Violation};

/// Rule code for forbidden-import.
pub const CODE: &str = "CL002";

/// Rule name for forbidden-import.
pub const NAME: &str = "forbidden-import";

/// Modules forbidden by default.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "os",
    "sys",
    "subprocess",
    "shutil",
    "pathlib",
    "io",
    "json",
    "pickle",
    "marshal",
    "yaml",
    "toml",
    "csv",
    "logging",
    "socket",
    "ssl",
    "http",
    "urllib",
    "requests",
    "httpx",
    "aiohttp",
    "asyncio",
    "threading",
    "multiprocessing",
    "sqlite3",
    "time",
    "datetime",
];

/// Forbids imports of implementation-affinity modules.
#[derive(Debug, Clone)]
pub struct ForbiddenImport {
    /// Forbidden module patterns.
    pub denylist: Vec<String>,
    /// File name granted the exemption.
    pub exempt_file: String,
    /// Modules the exempt file may import.
    pub exempt_modules: Vec<String>,
}

impl Default for ForbiddenImport {
    fn default() -> Self {
        Self::new()
    }
}

impl ForbiddenImport {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.iter().map(|s| (*s).to_string()).collect(),
            exempt_file: "core_types.py".to_string(),
            exempt_modules: vec!["datetime".to_string()],
        }
    }

    /// Creates the rule from its configuration block.
    #[must_use]
    pub fn from_config(config: Option<&RuleConfig>) -> Self {
        let mut rule = Self::new();
        if let Some(config) = config {
            if let Some(denylist) = config.get_str_array("denylist") {
                rule.denylist = denylist;
            }
            rule.exempt_file = config.get_str("exempt_file", &rule.exempt_file).to_string();
            if let Some(modules) = config.get_str_array("exempt_modules") {
                rule.exempt_modules = modules;
            }
        }
        rule
    }

    /// Replaces the denylist.
    #[must_use]
    pub fn denylist(mut self, modules: &[&str]) -> Self {
        self.denylist = modules.iter().map(|s| (*s).to_string()).collect();
        self
    }

    fn is_forbidden(&self, module: &str, ctx: &FileContext<'_>) -> bool {
        if !self.denylist.iter().any(|d| module_matches(module, d)) {
            return false;
        }
        let exempt = ctx.file_name() == self.exempt_file
            && self.exempt_modules.iter().any(|m| module_matches(module, m));
        !exempt
    }

    fn report(&self, module_node: Node<'_>, ctx: &FileContext<'_>) -> Option<Violation> {
        let module = nodes::text(module_node, ctx.text());
        if !self.is_forbidden(module, ctx) {
            return None;
        }
        ctx.violation(
            self,
            module_node,
            format!("Import of implementation module `{module}` in interface file"),
        )
        .map(|v| {
            v.with_suggestion(Suggestion::new(
                "Interfaces should depend only on typing constructs; move this import to the implementation",
            ))
        })
    }
}

impl Rule for ForbiddenImport {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> Category {
        Category::ForbiddenImport
    }

    fn description(&self) -> &'static str {
        "Forbids I/O, process, serialization, logging and networking imports"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["import_statement", "import_from_statement"]
    }

    fn visit(&self, node: Node<'_>, ctx: &FileContext<'_>) -> Vec<Violation> {
        if nodes::in_type_checking_block(node, ctx.text()) {
            return Vec::new();
        }

        match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                let names: Vec<_> = node.children_by_field_name("name", &mut cursor).collect();
                names
                    .into_iter()
                    .filter_map(|name| {
                        let module = if name.kind() == "aliased_import" {
                            name.child_by_field_name("name")?
                        } else {
                            name
                        };
                        self.report(module, ctx)
                    })
                    .collect()
            }
            _ => node
                .child_by_field_name("module_name")
                .filter(|m| m.kind() == "dotted_name")
                .and_then(|m| self.report(m, ctx))
                .into_iter()
                .collect(),
        }
    }
}
