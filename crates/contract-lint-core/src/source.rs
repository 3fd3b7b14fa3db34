//! Source model and region classifier.
//!
//! A [`SourceFile`] owns the text of one Python file and its parsed tree.
//! Documentation spans are computed once, at construction, before any rule
//! sees the tree. Rules then ask [`SourceFile::in_doc_span`] in O(1).

use crate::utils::nodes;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tree_sitter::{Language, Node, Parser, Tree};

/// Errors raised while turning text into a syntax tree.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The grammar could not be loaded into the parser.
    #[error("failed to load Python grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// The parser gave up without producing a tree.
    #[error("parser produced no tree")]
    NoTree,

    /// The tree contains syntax errors.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        /// 1-indexed line of the first error node.
        line: usize,
        /// 1-indexed column of the first error node.
        column: usize,
        /// Byte offset of the first error node.
        offset: usize,
        /// Short description.
        message: String,
    },
}

/// The tree-sitter Python language.
#[must_use]
pub fn python_language() -> Language {
    tree_sitter_python::LANGUAGE.into()
}

/// Parses Python text into a tree, failing on any syntax error.
///
/// # Errors
///
/// Returns [`SourceError::Syntax`] when the tree contains `ERROR` or
/// `MISSING` nodes.
pub fn parse_tree(text: &str) -> Result<Tree, SourceError> {
    let mut parser = Parser::new();
    parser.set_language(&python_language())?;
    let tree = parser.parse(text, None).ok_or(SourceError::NoTree)?;
    let root = tree.root_node();
    if root.has_error() {
        let bad = first_error(root).unwrap_or(root);
        let message = if bad.is_missing() {
            format!("missing `{}`", bad.kind())
        } else {
            "invalid syntax".to_string()
        };
        return Err(SourceError::Syntax {
            line: nodes::line(bad),
            column: nodes::column(bad),
            offset: bad.start_byte(),
            message,
        });
    }
    Ok(tree)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// The declaration a documentation span belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocOwner {
    /// The module itself.
    Module,
    /// A class (interface or otherwise).
    Interface,
    /// A function or method.
    Callable,
}

/// A closed, 1-indexed line range of a leading documentation string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentationSpan {
    /// First line of the string statement.
    pub start_line: usize,
    /// Last line of the string statement.
    pub end_line: usize,
    /// Kind of declaration carrying the span.
    pub owner: DocOwner,
    /// Line of the owning declaration (1 for the module).
    pub owner_line: usize,
}

impl DocumentationSpan {
    /// Returns true if `line` is inside the span.
    #[must_use]
    pub fn contains(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

/// Computes the documentation spans of a tree.
///
/// Every module, class and function whose first body statement is a bare
/// string literal contributes exactly one span.
#[must_use]
pub fn classify(root: Node<'_>) -> Vec<DocumentationSpan> {
    let mut spans = Vec::new();
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let owner = match node.kind() {
            "module" => Some(DocOwner::Module),
            "class_definition" => Some(DocOwner::Interface),
            "function_definition" => Some(DocOwner::Callable),
            _ => None,
        };
        if let Some(owner) = owner {
            if let Some(stmt) = nodes::first_statement(node).filter(|s| nodes::is_docstring(*s)) {
                spans.push(DocumentationSpan {
                    start_line: nodes::line(stmt),
                    end_line: stmt.end_position().row + 1,
                    owner,
                    owner_line: nodes::line(node),
                });
            }
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return spans;
            }
        }
    }
}

/// A parsed Python file.
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    tree: Tree,
    spans: Vec<DocumentationSpan>,
    doc_lines: Vec<bool>,
}

impl SourceFile {
    /// Parses and classifies a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse cleanly.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, SourceError> {
        let text = text.into();
        let tree = parse_tree(&text)?;
        let spans = classify(tree.root_node());

        let line_count = text.lines().count() + 2;
        let mut doc_lines = vec![false; line_count];
        for span in &spans {
            for line in span.start_line..=span.end_line.min(line_count - 1) {
                doc_lines[line] = true;
            }
        }

        Ok(Self {
            path: path.into(),
            text,
            tree,
            spans,
            doc_lines,
        })
    }

    /// Path identifier of this file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Original file text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parsed syntax tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Root node of the tree.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Documentation spans, in tree order.
    #[must_use]
    pub fn spans(&self) -> &[DocumentationSpan] {
        &self.spans
    }

    /// True if a 1-indexed line lies inside any documentation span.
    #[must_use]
    pub fn in_doc_span(&self, line: usize) -> bool {
        self.doc_lines.get(line).copied().unwrap_or(false)
    }

    /// Text of a 1-indexed line, trimmed.
    #[must_use]
    pub fn line_text(&self, line: usize) -> &str {
        line.checked_sub(1)
            .and_then(|i| self.text.lines().nth(i))
            .map_or("", str::trim)
    }

    /// Class definitions that inherit `Protocol`.
    #[must_use]
    pub fn interfaces(&self) -> Vec<Node<'_>> {
        let mut found = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            if nodes::is_interface(node, &self.text) {
                found.push(node);
            }
            let mut cursor = node.walk();
            stack.extend(node.named_children(&mut cursor));
        }
        found.sort_by_key(Node::start_byte);
        found
    }

    /// Number of interfaces that are pure structural contracts.
    #[must_use]
    pub fn pure_interface_count(&self) -> usize {
        self.interfaces()
            .into_iter()
            .filter(|c| nodes::is_pure_interface(*c, &self.text))
            .count()
    }
}
