//! Transformation proposals for one parsed file.

use std::collections::BTreeSet;
use std::path::Path;

use contract_lint_core::tree_sitter::Node;
use contract_lint_core::utils::{check_allow_with_reason, nodes, AllowCheck};
use contract_lint_core::{Config, SourceFile, Transformation, TransformKind};
use contract_lint_rules::missing_marker::{self, AWAITABLE};
use contract_lint_rules::MissingMarker;
use tracing::debug;

use crate::render::Renderer;
use crate::scope::TypingScope;

/// Proposes the enabled rewrites for a file.
#[derive(Debug, Clone)]
pub struct Proposer {
    kinds: BTreeSet<TransformKind>,
    marker: MissingMarker,
}

impl Default for Proposer {
    fn default() -> Self {
        Self::new(TransformKind::ALL)
    }
}

impl Proposer {
    /// Creates a proposer for the given kinds.
    #[must_use]
    pub fn new(kinds: impl IntoIterator<Item = TransformKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            marker: MissingMarker::new(),
        }
    }

    /// Creates a proposer from `[fix]` and the `missing-marker` rule options.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            kinds: config.fix.kinds.iter().copied().collect(),
            marker: MissingMarker::from_config(config.rule(missing_marker::NAME)),
        }
    }

    /// Enabled kinds.
    #[must_use]
    pub fn kinds(&self) -> &BTreeSet<TransformKind> {
        &self.kinds
    }

    /// Proposes non-overlapping transformations, sorted by position.
    ///
    /// `file` is the path recorded in each transformation.
    #[must_use]
    pub fn propose(&self, source: &SourceFile, file: &Path) -> Vec<Transformation> {
        let src = source.text();
        let root = source.root();
        let scope = TypingScope::collect(root, src);
        let renderer = Renderer::new(src, &scope, &self.kinds);
        let wrap = self.kinds.contains(&TransformKind::AwaitableWrapping);

        let mut out = Vec::new();
        let mut first_wrapped: Option<usize> = None;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let mut skip = None;
            if wrap && node.kind() == "function_definition" {
                if let Some(plan) = self.awaitable_plan(node, src) {
                    if let Some(def) = plan.def_keyword {
                        out.push(transformation(
                            file,
                            def,
                            src,
                            "async def".to_string(),
                            TransformKind::AwaitableWrapping,
                        ));
                    }
                    let inner = renderer.render(plan.return_type);
                    out.push(transformation(
                        file,
                        plan.return_type,
                        src,
                        format!("{AWAITABLE}[{}]", inner.text.trim()),
                        TransformKind::AwaitableWrapping,
                    ));
                    let start = node.start_byte();
                    first_wrapped = Some(first_wrapped.map_or(start, |first| first.min(start)));
                    skip = Some(plan.return_type.id());
                }
            } else if renderer.is_candidate(node) {
                let rendered = renderer.render(node);
                if let Some(&kind) = rendered.kinds.first() {
                    out.push(transformation(file, node, src, rendered.text, kind));
                }
                continue;
            }

            let mut cursor = node.walk();
            let children: Vec<_> = node
                .children(&mut cursor)
                .filter(|c| Some(c.id()) != skip)
                .collect();
            stack.extend(children.into_iter().rev());
        }

        if let Some(first) = first_wrapped {
            if !scope.awaitable_bound {
                out.push(import_insertion(file, &scope, src, first));
            }
        }

        out.sort_by_key(|t| t.start_byte);
        debug!(
            file = %file.display(),
            count = out.len(),
            "Transformations proposed"
        );
        out
    }

    /// Decides whether a callable gets the awaitable wrapper.
    fn awaitable_plan<'t>(&self, func: Node<'t>, src: &str) -> Option<AwaitablePlan<'t>> {
        let return_type = func.child_by_field_name("return_type")?;
        if self.is_opted_out(func, return_type, src) {
            return None;
        }
        if nodes::is_async(func) {
            return (!self.marker.is_wrapped(return_type, src)).then_some(AwaitablePlan {
                return_type,
                def_keyword: None,
            });
        }
        if !self.marker.is_sync_io_method(func, src) {
            return None;
        }
        let mut cursor = func.walk();
        let def_keyword = func.children(&mut cursor).find(|c| c.kind() == "def")?;
        Some(AwaitablePlan {
            return_type,
            def_keyword: Some(def_keyword),
        })
    }

    /// An allow directive for `missing-marker` on the callable or its return
    /// annotation keeps it as declared.
    fn is_opted_out(&self, func: Node<'_>, return_type: Node<'_>, src: &str) -> bool {
        let name_line = func
            .child_by_field_name("name")
            .map_or_else(|| nodes::line(func), nodes::line);
        [name_line, nodes::line(return_type)].into_iter().any(|line| {
            matches!(
                check_allow_with_reason(src, line, missing_marker::NAME),
                AllowCheck::Allowed { .. }
            )
        })
    }
}

struct AwaitablePlan<'t> {
    return_type: Node<'t>,
    def_keyword: Option<Node<'t>>,
}

fn transformation(
    file: &Path,
    node: Node<'_>,
    src: &str,
    replacement_text: String,
    kind: TransformKind,
) -> Transformation {
    Transformation {
        file: file.to_path_buf(),
        line: nodes::line(node),
        column: nodes::column(node),
        kind,
        original_text: nodes::text(node, src).to_string(),
        replacement_text,
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
    }
}

/// Adds `Awaitable` to the first `from typing import ...`, or a new import line.
///
/// The existing import is only extended when it runs before `first_wrapped`,
/// the earliest rewritten definition.
fn import_insertion(
    file: &Path,
    scope: &TypingScope,
    src: &str,
    first_wrapped: usize,
) -> Transformation {
    let usable = scope
        .typing_import
        .as_ref()
        .filter(|target| target.last_name.0 < first_wrapped);
    if let Some(target) = usable {
        let (start_byte, end_byte) = target.last_name;
        let (line, column) = target.position;
        let replacement_text = if target.parenthesized {
            let indent = " ".repeat(column.saturating_sub(1));
            format!("{},\n{indent}{AWAITABLE}", target.last_name_text)
        } else {
            format!("{}, {AWAITABLE}", target.last_name_text)
        };
        return Transformation {
            file: file.to_path_buf(),
            line,
            column,
            kind: TransformKind::AwaitableWrapping,
            original_text: target.last_name_text.clone(),
            replacement_text,
            start_byte,
            end_byte,
        };
    }

    let at = scope.import_insert_at;
    let before = src.get(..at).unwrap_or("");
    let line = before.matches('\n').count() + 1;
    let statement = format!("from typing import {AWAITABLE}");
    let replacement_text = if at > 0 && !before.ends_with('\n') {
        format!("\n{statement}")
    } else {
        format!("{statement}\n")
    };
    Transformation {
        file: file.to_path_buf(),
        line,
        column: 1,
        kind: TransformKind::AwaitableWrapping,
        original_text: String::new(),
        replacement_text,
        start_byte: at,
        end_byte: at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn propose(src: &str, kinds: &[TransformKind]) -> Vec<Transformation> {
        let source = SourceFile::parse("iface.py", src).expect("Failed to parse");
        Proposer::new(kinds.iter().copied()).propose(&source, Path::new("iface.py"))
    }

    #[test]
    fn outermost_rewrite_is_one_transformation() {
        let ts = propose(
            "from typing import Optional, Union\ndef f(v: Optional[Union[int, str]]) -> None: ...\n",
            &TransformKind::ALL,
        );
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].kind, TransformKind::NullableUnion);
        assert_eq!(ts[0].original_text, "Optional[Union[int, str]]");
        assert_eq!(ts[0].replacement_text, "int | str | None");
        assert_eq!((ts[0].line, ts[0].column), (2, 10));
    }

    #[test]
    fn async_return_is_wrapped_and_import_extended() {
        let ts = propose(
            "from typing import Protocol\nclass ProtocolRepo(Protocol):\n    async def get(self) -> Optional[int]: ...\n",
            &[TransformKind::AwaitableWrapping],
        );
        assert_eq!(ts.len(), 2);
        assert_eq!(ts[0].original_text, "Protocol");
        assert_eq!(ts[0].replacement_text, "Protocol, Awaitable");
        assert_eq!(ts[1].replacement_text, "Awaitable[Optional[int]]");
    }

    #[test]
    fn sync_io_method_becomes_async() {
        let ts = propose(
            "from typing import Awaitable, Protocol\nclass ProtocolStore(Protocol):\n    def save(self, key: str) -> None: ...\n    def key_for(self) -> str: ...\n",
            &TransformKind::ALL,
        );
        let texts: Vec<_> = ts
            .iter()
            .map(|t| (t.original_text.as_str(), t.replacement_text.as_str()))
            .collect();
        assert_eq!(
            texts,
            vec![("def", "async def"), ("None", "Awaitable[None]")]
        );
    }

    #[test]
    fn allow_directive_opts_out() {
        let ts = propose(
            "from typing import Awaitable\n# contract-lint: allow(missing-marker) reason=\"returns a task handle\"\nasync def spawn() -> Task: ...\n",
            &TransformKind::ALL,
        );
        assert!(ts.is_empty());
    }

    #[test]
    fn new_import_line_after_leading_imports() {
        let ts = propose(
            "\"\"\"Contracts.\"\"\"\nimport abc\n\nasync def ping() -> bool: ...\n",
            &TransformKind::ALL,
        );
        let insert = ts.iter().find(|t| t.original_text.is_empty()).expect("insertion");
        assert_eq!(insert.replacement_text, "from typing import Awaitable\n");
        assert_eq!(insert.line, 3);
    }

    #[test]
    fn docstring_examples_are_left_alone() {
        let ts = propose(
            "from typing import Optional\ndef f() -> None:\n    \"\"\"Example: x: Optional[int]\"\"\"\n    ...\n",
            &TransformKind::ALL,
        );
        assert!(ts.is_empty());
    }

    #[test]
    fn typing_import_below_the_def_gets_a_new_line() {
        let ts = propose(
            "async def f() -> int: ...\nfrom typing import Protocol\n",
            &TransformKind::ALL,
        );
        assert!(!ts.iter().any(|t| t.original_text == "Protocol"));
        let insert = ts.iter().find(|t| t.original_text.is_empty()).expect("insertion");
        assert_eq!(insert.replacement_text, "from typing import Awaitable\n");
        assert_eq!((insert.line, insert.start_byte), (1, 0));
        assert_eq!(ts.len(), 2);
    }
}
