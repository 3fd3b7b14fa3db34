//! What the names of a module refer to, as far as rewrites need to know.

use std::collections::{HashMap, HashSet};

use contract_lint_core::tree_sitter::Node;
use contract_lint_core::utils::nodes;

/// Modules whose `Optional`/`Union` the union rewrites understand.
pub const TYPING_MODULES: &[&str] = &["typing", "typing_extensions"];

/// Modules that export a usable `Awaitable`.
const AWAITABLE_MODULES: &[&str] = &["typing", "typing_extensions", "collections.abc"];

/// Where `Awaitable` can be added to an existing `from typing import ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingImport {
    /// Byte range of the last imported name.
    pub last_name: (usize, usize),
    /// Text of the last imported name.
    pub last_name_text: String,
    /// Position of the last imported name (1-indexed line, column).
    pub position: (usize, usize),
    /// Whether the names are wrapped in parentheses.
    pub parenthesized: bool,
}

/// Import facts of one module.
#[derive(Debug, Clone, Default)]
pub struct TypingScope {
    /// Local name to the `typing` name it is bound to (`Opt` -> `Optional`).
    names: HashMap<String, String>,
    /// Local names bound to a typing module (`typing`, `t` in `import typing as t`).
    modules: HashSet<String>,
    /// `from typing import *` seen.
    wildcard: bool,
    /// Names imported under `if TYPE_CHECKING:`, with the end of their import.
    guarded: Vec<(String, usize)>,
    /// `from __future__ import annotations` seen.
    pub future_annotations: bool,
    /// `Awaitable` is usable as a bare name.
    pub awaitable_bound: bool,
    /// First top-level `from typing import ...` outside `TYPE_CHECKING`.
    pub typing_import: Option<TypingImport>,
    /// Byte offset where a new import line goes.
    pub import_insert_at: usize,
}

impl TypingScope {
    /// Collects the import facts of a module.
    #[must_use]
    pub fn collect(root: Node<'_>, src: &str) -> Self {
        let mut scope = Self {
            future_annotations: nodes::has_future_annotations(root, src),
            import_insert_at: import_insert_offset(root, src),
            ..Self::default()
        };

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "import_statement" => scope.plain_import(node, src),
                "import_from_statement" => scope.from_import(node, src),
                _ => {
                    let mut cursor = node.walk();
                    let children: Vec<_> = node.named_children(&mut cursor).collect();
                    stack.extend(children.into_iter().rev());
                }
            }
        }
        scope
    }

    /// Resolves the head of a subscription to a `typing` name.
    ///
    /// `Optional`, `t.Optional` and `Opt` (from `import Optional as Opt`) all
    /// resolve to `"Optional"` when bound to a typing module.
    #[must_use]
    pub fn resolve_head<'a>(&'a self, head: Node<'_>, src: &'a str) -> Option<&'a str> {
        match head.kind() {
            "identifier" => {
                let name = nodes::text(head, src);
                self.names
                    .get(name)
                    .map(String::as_str)
                    .or_else(|| self.wildcard.then_some(name))
            }
            "attribute" => {
                let object = head.child_by_field_name("object")?;
                let attr = head.child_by_field_name("attribute")?;
                self.modules
                    .contains(nodes::text(object, src))
                    .then(|| nodes::text(attr, src))
            }
            _ => None,
        }
    }

    /// True if `name` (or its first dotted segment) was imported under
    /// `TYPE_CHECKING` before `offset`.
    #[must_use]
    pub fn is_guarded(&self, name: &str, offset: usize) -> bool {
        let first = name.split('.').next().unwrap_or(name);
        self.guarded
            .iter()
            .any(|(guarded, end)| guarded == first && *end <= offset)
    }

    fn plain_import(&mut self, node: Node<'_>, src: &str) {
        let guarded = nodes::in_type_checking_block(node, src);
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            let (module, local) = if name.kind() == "aliased_import" {
                let module = name.child_by_field_name("name").map(|n| nodes::text(n, src));
                let alias = name.child_by_field_name("alias").map(|n| nodes::text(n, src));
                match (module, alias) {
                    (Some(module), Some(alias)) => (module, alias.to_string()),
                    _ => continue,
                }
            } else {
                let module = nodes::text(name, src);
                (module, module.split('.').next().unwrap_or(module).to_string())
            };
            if TYPING_MODULES.contains(&module) {
                self.modules.insert(local.clone());
            }
            if guarded {
                self.guarded.push((local, node.end_byte()));
            }
        }
    }

    fn from_import(&mut self, node: Node<'_>, src: &str) {
        let Some(module_node) = node.child_by_field_name("module_name") else {
            return;
        };
        let module = nodes::text(module_node, src);
        let guarded = nodes::in_type_checking_block(node, src);
        let typing = TYPING_MODULES.contains(&module);

        let mut cursor = node.walk();
        let has_wildcard = node
            .children(&mut cursor)
            .any(|c| c.kind() == "wildcard_import");
        if has_wildcard {
            if typing {
                self.wildcard = true;
            }
            if AWAITABLE_MODULES.contains(&module) {
                self.awaitable_bound = true;
            }
            return;
        }

        let mut last = None;
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            let (imported, local) = if name.kind() == "aliased_import" {
                let imported = name.child_by_field_name("name").map(|n| nodes::text(n, src));
                let alias = name.child_by_field_name("alias").map(|n| nodes::text(n, src));
                match (imported, alias) {
                    (Some(imported), Some(alias)) => (imported, alias),
                    _ => continue,
                }
            } else {
                let imported = nodes::text(name, src);
                (imported, imported)
            };
            if typing {
                self.names.insert(local.to_string(), imported.to_string());
            }
            if AWAITABLE_MODULES.contains(&module)
                && imported == "Awaitable"
                && local == "Awaitable"
                && !guarded
            {
                self.awaitable_bound = true;
            }
            if guarded {
                self.guarded.push((local.to_string(), node.end_byte()));
            }
            last = Some(name);
        }

        let top_level = node.parent().is_some_and(|p| p.kind() == "module");
        if module == "typing" && top_level && self.typing_import.is_none() {
            if let Some(last) = last {
                let mut cursor = node.walk();
                let parenthesized = node.children(&mut cursor).any(|c| c.kind() == "(");
                self.typing_import = Some(TypingImport {
                    last_name: (last.start_byte(), last.end_byte()),
                    last_name_text: nodes::text(last, src).to_string(),
                    position: (nodes::line(last), nodes::column(last)),
                    parenthesized,
                });
            }
        }
    }
}

/// Byte offset just past the leading block of top-level imports.
///
/// Falls back to the end of the module docstring, then to the start of the file.
fn import_insert_offset(root: Node<'_>, src: &str) -> usize {
    let mut offset = 0;
    for (index, stmt) in nodes::statements(root).into_iter().enumerate() {
        let is_import = matches!(
            stmt.kind(),
            "import_statement" | "import_from_statement" | "future_import_statement"
        );
        if is_import || (index == 0 && nodes::is_docstring(stmt)) {
            offset = line_end(src, stmt.end_byte());
        } else {
            break;
        }
    }
    offset
}

/// Offset of the first byte after the newline ending the line that contains `offset`.
fn line_end(src: &str, offset: usize) -> usize {
    src.get(offset..)
        .and_then(|rest| rest.find('\n'))
        .map_or(src.len(), |nl| offset + nl + 1)
}
