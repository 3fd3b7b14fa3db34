//! Compositional rendering of type expressions.
//!
//! The tree is never mutated. A rewritten node's text is built from the
//! rendered text of its children, so nested rewrites end up inside a single
//! replacement for the outermost rewritten node.

use std::collections::BTreeSet;

use contract_lint_core::tree_sitter::Node;
use contract_lint_core::utils::nodes;
use contract_lint_core::TransformKind;

use crate::scope::TypingScope;

/// Rendered text of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// New text of the node.
    pub text: String,
    /// Rewrites applied inside the node, outermost first.
    pub kinds: Vec<TransformKind>,
    /// Whether the text still contains a string literal.
    pub has_string: bool,
}

impl Rendered {
    fn unchanged(text: &str, has_string: bool) -> Self {
        Self {
            text: text.to_string(),
            kinds: Vec::new(),
            has_string,
        }
    }
}

/// A node the renderer may rewrite.
#[derive(Debug, Clone)]
enum Candidate<'t, 's> {
    Optional(Node<'t>),
    Union(Vec<Node<'t>>),
    ForwardRef(&'s str),
}

/// Renders nodes of one file with the enabled rewrites.
pub struct Renderer<'a> {
    src: &'a str,
    scope: &'a TypingScope,
    kinds: &'a BTreeSet<TransformKind>,
}

impl<'a> Renderer<'a> {
    /// Creates a renderer for one file.
    #[must_use]
    pub fn new(src: &'a str, scope: &'a TypingScope, kinds: &'a BTreeSet<TransformKind>) -> Self {
        Self { src, scope, kinds }
    }

    /// True if the node itself is subject to a type rewrite.
    #[must_use]
    pub fn is_candidate(&self, node: Node<'_>) -> bool {
        self.candidate(node).is_some()
    }

    /// Renders a node with every applicable rewrite inside it.
    #[must_use]
    pub fn render(&self, node: Node<'_>) -> Rendered {
        if let Some(candidate) = self.candidate(node) {
            if let Some(rendered) = self.rewrite(node, candidate) {
                return rendered;
            }
        }
        self.compose(node)
    }

    /// Copies the node's text, substituting the rendered text of each child.
    fn compose(&self, node: Node<'_>) -> Rendered {
        let is_string = matches!(node.kind(), "string" | "concatenated_string");
        if node.child_count() == 0 || is_string {
            return Rendered::unchanged(nodes::text(node, self.src), is_string);
        }

        let mut text = String::new();
        let mut kinds = Vec::new();
        let mut has_string = false;
        let mut pos = node.start_byte();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            text.push_str(self.slice(pos, child.start_byte()));
            let rendered = self.render(child);
            text.push_str(&rendered.text);
            kinds.extend(rendered.kinds);
            has_string |= rendered.has_string;
            pos = child.end_byte();
        }
        text.push_str(self.slice(pos, node.end_byte()));
        Rendered {
            text,
            kinds,
            has_string,
        }
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.src.get(start..end).unwrap_or("")
    }

    fn candidate<'t>(&self, node: Node<'t>) -> Option<Candidate<'t, 'a>> {
        match node.kind() {
            "generic_type" | "subscript" => {
                let (head, args) = subscription(node)?;
                match self.scope.resolve_head(head, self.src)? {
                    "Optional" if self.kinds.contains(&TransformKind::NullableUnion) => {
                        let [arg] = args.as_slice() else {
                            return None;
                        };
                        Some(Candidate::Optional(*arg))
                    }
                    "Union"
                        if self.kinds.contains(&TransformKind::MultiArmUnion) && args.len() > 1 =>
                    {
                        Some(Candidate::Union(args))
                    }
                    _ => None,
                }
            }
            "string" if self.kinds.contains(&TransformKind::ForwardReference) => {
                if !self.scope.future_annotations || !in_annotation(node) {
                    return None;
                }
                let name = nodes::plain_string_value(node, self.src)?;
                (is_dotted_identifier(name) && self.scope.is_guarded(name, node.start_byte()))
                    .then_some(Candidate::ForwardRef(name))
            }
            _ => None,
        }
    }

    fn rewrite(&self, node: Node<'_>, candidate: Candidate<'_, 'a>) -> Option<Rendered> {
        let (kind, arms) = match candidate {
            Candidate::ForwardRef(name) => {
                return Some(Rendered {
                    text: name.to_string(),
                    kinds: vec![TransformKind::ForwardReference],
                    has_string: false,
                });
            }
            Candidate::Optional(arg) => (TransformKind::NullableUnion, vec![self.render(arg)]),
            Candidate::Union(args) => (
                TransformKind::MultiArmUnion,
                args.into_iter().map(|a| self.render(a)).collect(),
            ),
        };

        // `"A" | None` raises at runtime; only deferred annotations may keep strings.
        let has_string = arms.iter().any(|a| a.has_string);
        if has_string && !(self.scope.future_annotations && in_annotation(node)) {
            return None;
        }

        let mut parts: Vec<&str> = arms.iter().map(|a| a.text.trim()).collect();
        if kind == TransformKind::NullableUnion {
            parts.push("None");
        }
        let mut text = parts.join(" | ");
        if needs_parens(node) {
            text = format!("({text})");
        }

        let mut kinds = vec![kind];
        kinds.extend(arms.into_iter().flat_map(|a| a.kinds));
        Some(Rendered {
            text,
            kinds,
            has_string,
        })
    }
}

/// Head and arguments of `X[...]` in either its type or expression form.
fn subscription(node: Node<'_>) -> Option<(Node<'_>, Vec<Node<'_>>)> {
    if node.kind() == "generic_type" {
        let children = nodes::named_children(node);
        let head = children.iter().copied().find(|c| c.kind() == "identifier")?;
        let params = children.iter().copied().find(|c| c.kind() == "type_parameter")?;
        return Some((head, nodes::named_children(params)));
    }
    let head = node.child_by_field_name("value")?;
    let mut cursor = node.walk();
    let args: Vec<_> = node.children_by_field_name("subscript", &mut cursor).collect();
    if args.iter().any(|a| a.kind() == "slice") {
        return None;
    }
    Some((head, args))
}

/// True inside an annotation.
fn in_annotation(node: Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.kind() == "type" {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// True if `A | B` in place of the node would bind differently.
fn needs_parens(node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "attribute" | "call" | "await" | "unary_operator" | "member_type" => true,
        "subscript" => parent
            .child_by_field_name("value")
            .is_some_and(|v| v.id() == node.id()),
        "binary_operator" => parent
            .child_by_field_name("operator")
            .is_some_and(|op| op.kind() != "|"),
        _ => false,
    }
}

fn is_dotted_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract_lint_core::parse_tree;

    fn render_all(src: &str, kinds: &[TransformKind]) -> String {
        let tree = parse_tree(src).expect("Failed to parse");
        let scope = TypingScope::collect(tree.root_node(), src);
        let kinds: BTreeSet<_> = kinds.iter().copied().collect();
        Renderer::new(src, &scope, &kinds).render(tree.root_node()).text
    }

    const ALL: &[TransformKind] = &TransformKind::ALL;

    #[test]
    fn optional_becomes_union_with_none() {
        let out = render_all("from typing import Optional\nx: Optional[int] = None\n", ALL);
        insta::assert_snapshot!(out.trim_end(), @r"
        from typing import Optional
        x: int | None = None
        ");
    }

    #[test]
    fn union_keeps_arm_order() {
        let out = render_all("import typing\ndef f(v: typing.Union[C, A, B]) -> None: ...\n", ALL);
        assert!(out.contains("v: C | A | B"), "{out}");
    }

    #[test]
    fn nested_rewrites_compose() {
        let out = render_all(
            "from typing import Optional, Union\ndef f(v: Optional[Union[int, list[Optional[str]]]]) -> None: ...\n",
            ALL,
        );
        assert!(out.contains("v: int | list[str | None] | None"), "{out}");
    }

    #[test]
    fn foreign_optional_is_untouched() {
        let src = "from mylib import Optional\nx: Optional[int]\n";
        assert_eq!(render_all(src, ALL), src);
    }

    #[test]
    fn string_arm_blocks_union_without_future_import() {
        let src = "from typing import Optional\nx: Optional[\"Later\"] = None\n";
        assert_eq!(render_all(src, ALL), src);
    }

    #[test]
    fn forward_reference_needs_guarded_import() {
        let src = "from __future__ import annotations\nfrom typing import TYPE_CHECKING\nif TYPE_CHECKING:\n    from pkg.user import User\ndef f(u: \"User\", g: \"Group\") -> None: ...\nlabel = \"User\"\n";
        let out = render_all(src, ALL);
        assert!(out.contains("def f(u: User, g: \"Group\")"), "{out}");
        assert!(out.contains("label = \"User\""), "{out}");
    }

    #[test]
    fn disabled_kinds_are_skipped() {
        let src = "from typing import Optional, Union\nx: Union[Optional[int], str]\n";
        let out = render_all(src, &[TransformKind::NullableUnion]);
        assert!(out.contains("x: Union[int | None, str]"), "{out}");
    }

    #[test]
    fn attribute_access_gets_parentheses() {
        let out = render_all("from typing import Optional\nargs = Optional[int].__args__\n", ALL);
        assert!(out.contains("args = (int | None).__args__"), "{out}");
    }
}
