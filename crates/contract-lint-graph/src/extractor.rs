//! Import extraction from Python syntax trees.
//!
//! `LanguageExtractor` is the extension point for other languages; the
//! graph builder only consumes the language-agnostic [`ImportInfo`] records.

use contract_lint_core::tree_sitter::Node;
use contract_lint_core::utils::nodes;

/// A single import extracted from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (1-indexed).
    pub column: usize,
    /// Dotted module path without leading dots (`a.b` in `from ..a.b import c`).
    pub module: String,
    /// Number of leading dots of a relative import (0 for absolute).
    pub level: usize,
    /// Names imported by a `from` import; empty for `import x` and `*`.
    pub names: Vec<String>,
    /// Whether the import sits inside `if TYPE_CHECKING:`.
    pub type_checking: bool,
}

impl ImportInfo {
    /// True for `from . import x` style imports.
    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.level > 0
    }
}

/// Trait for language-specific import extraction.
///
/// Implement this to add support for a new language. The extractor receives
/// an already-parsed tree and returns every import in source order.
pub trait LanguageExtractor: Send + Sync {
    /// Language identifier (e.g., `"python"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this extractor handles (e.g., `&[".py"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Extracts all imports of a file.
    fn imports(&self, root: Node<'_>, source: &str) -> Vec<ImportInfo>;
}

/// Extracts `import` and `from ... import` statements from Python source.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonExtractor;

impl PythonExtractor {
    /// Creates a new Python extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn plain_import(node: Node<'_>, src: &str, type_checking: bool) -> Vec<ImportInfo> {
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
                Some(ImportInfo {
                    line: nodes::line(module),
                    column: nodes::column(module),
                    module: nodes::text(module, src).to_string(),
                    level: 0,
                    names: Vec::new(),
                    type_checking,
                })
            })
            .collect()
    }

    fn from_import(node: Node<'_>, src: &str, type_checking: bool) -> Option<ImportInfo> {
        let module_node = node.child_by_field_name("module_name")?;
        let (level, module) = if module_node.kind() == "relative_import" {
            let mut level = 0;
            let mut module = String::new();
            for child in nodes::named_children(module_node) {
                match child.kind() {
                    "import_prefix" => level = nodes::text(child, src).matches('.').count(),
                    "dotted_name" => module = nodes::text(child, src).to_string(),
                    _ => {}
                }
            }
            (level, module)
        } else {
            (0, nodes::text(module_node, src).to_string())
        };

        let mut cursor = node.walk();
        let names = node
            .children_by_field_name("name", &mut cursor)
            .filter_map(|name| {
                let target = if name.kind() == "aliased_import" {
                    name.child_by_field_name("name")?
                } else {
                    name
                };
                Some(nodes::text(target, src).to_string())
            })
            .collect();

        Some(ImportInfo {
            line: nodes::line(node),
            column: nodes::column(node),
            module,
            level,
            names,
            type_checking,
        })
    }
}

impl LanguageExtractor for PythonExtractor {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".py"]
    }

    fn imports(&self, root: Node<'_>, source: &str) -> Vec<ImportInfo> {
        let mut imports = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "import_statement" => {
                    let guarded = nodes::in_type_checking_block(node, source);
                    imports.extend(Self::plain_import(node, source, guarded));
                }
                "import_from_statement" => {
                    let guarded = nodes::in_type_checking_block(node, source);
                    imports.extend(Self::from_import(node, source, guarded));
                }
                _ => {
                    let mut cursor = node.walk();
                    stack.extend(node.named_children(&mut cursor));
                }
            }
        }
        imports.sort_by_key(|i| (i.line, i.column));
        imports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract_lint_core::parse_tree;

    fn extract(src: &str) -> Vec<ImportInfo> {
        let tree = parse_tree(src).expect("Failed to parse");
        PythonExtractor::new().imports(tree.root_node(), src)
    }

    #[test]
    fn extracts_plain_imports() {
        let imports = extract("import a.b, c as d\n");
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].module, "a.b");
        assert_eq!(imports[1].module, "c");
        assert!(imports.iter().all(|i| i.names.is_empty() && i.level == 0));
    }

    #[test]
    fn extracts_from_imports_with_names() {
        let imports = extract("from pkg.sub import (x, y as z)\nfrom pkg import *\n");
        assert_eq!(imports[0].module, "pkg.sub");
        assert_eq!(imports[0].names, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(imports[1].module, "pkg");
        assert!(imports[1].names.is_empty());
    }

    #[test]
    fn extracts_relative_levels() {
        let imports = extract("from . import a\nfrom ..core.types import T\n");
        assert_eq!(imports[0].level, 1);
        assert_eq!(imports[0].module, "");
        assert_eq!(imports[0].names, vec!["a".to_string()]);
        assert_eq!(imports[1].level, 2);
        assert_eq!(imports[1].module, "core.types");
    }

    #[test]
    fn marks_type_checking_imports() {
        let imports = extract(
            "from typing import TYPE_CHECKING\nif TYPE_CHECKING:\n    from pkg.b import B\ndef f():\n    import pkg.c\n",
        );
        assert_eq!(imports.len(), 3);
        assert!(!imports[0].type_checking);
        assert!(imports[1].type_checking);
        assert!(!imports[2].type_checking);
        assert_eq!(imports[2].module, "pkg.c");
    }

    #[test]
    fn future_imports_are_not_dependencies() {
        assert!(extract("from __future__ import annotations\n").is_empty());
    }
}
