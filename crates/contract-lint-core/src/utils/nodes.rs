//! Helpers for inspecting the Python syntax tree.
//!
//! Everything here is a pure query over `tree_sitter::Node` values and the
//! file text they were parsed from.

use tree_sitter::Node;

/// Returns the source text covered by a node.
#[must_use]
pub fn text<'s>(node: Node<'_>, src: &'s str) -> &'s str {
    src.get(node.byte_range()).unwrap_or("")
}

/// 1-indexed line of the node start.
#[must_use]
pub fn line(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// 1-indexed column of the node start.
#[must_use]
pub fn column(node: Node<'_>) -> usize {
    node.start_position().column + 1
}

/// Named children of a node, comments excluded.
#[must_use]
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

/// Statements of a `block` or `module`, comments excluded.
#[must_use]
pub fn statements(block: Node<'_>) -> Vec<Node<'_>> {
    named_children(block)
}

/// The `body` block of a class or function definition.
#[must_use]
pub fn body(def: Node<'_>) -> Option<Node<'_>> {
    def.child_by_field_name("body")
}

/// The first statement of a module or definition body.
#[must_use]
pub fn first_statement(node: Node<'_>) -> Option<Node<'_>> {
    let container = if node.kind() == "module" {
        node
    } else {
        body(node)?
    };
    statements(container).into_iter().next()
}

/// True for a bare string-literal expression statement.
#[must_use]
pub fn is_docstring(stmt: Node<'_>) -> bool {
    if stmt.kind() != "expression_statement" {
        return false;
    }
    let children = named_children(stmt);
    children.len() == 1 && matches!(children[0].kind(), "string" | "concatenated_string")
}

/// True for `...` or `pass`.
#[must_use]
pub fn is_placeholder(stmt: Node<'_>) -> bool {
    match stmt.kind() {
        "pass_statement" => true,
        "expression_statement" => {
            let children = named_children(stmt);
            children.len() == 1 && children[0].kind() == "ellipsis"
        }
        _ => false,
    }
}

/// True for `raise NotImplementedError` with or without arguments.
#[must_use]
pub fn is_not_implemented(stmt: Node<'_>, src: &str) -> bool {
    if stmt.kind() != "raise_statement" {
        return false;
    }
    let Some(raised) = named_children(stmt).into_iter().next() else {
        return false;
    };
    let target = if raised.kind() == "call" {
        raised.child_by_field_name("function").unwrap_or(raised)
    } else {
        raised
    };
    last_segment(text(target, src)) == "NotImplementedError"
}

/// True if the statement does something at run time.
///
/// Documentation, placeholders and `raise NotImplementedError` are inert.
#[must_use]
pub fn is_executable(stmt: Node<'_>, src: &str) -> bool {
    !(is_docstring(stmt) || is_placeholder(stmt) || is_not_implemented(stmt, src))
}

/// True if a callable body is `[placeholder]` or `[doc, placeholder]`.
#[must_use]
pub fn has_placeholder_body(func: Node<'_>) -> bool {
    let Some(block) = body(func) else {
        return false;
    };
    match statements(block).as_slice() {
        [only] => is_placeholder(*only),
        [doc, last] => is_docstring(*doc) && is_placeholder(*last),
        _ => false,
    }
}

/// Unwraps a `decorated_definition` to the definition it decorates.
#[must_use]
pub fn definition(node: Node<'_>) -> Node<'_> {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition").unwrap_or(node)
    } else {
        node
    }
}

/// Decorators attached to a class or function definition.
#[must_use]
pub fn decorators(def: Node<'_>) -> Vec<Node<'_>> {
    match def.parent() {
        Some(parent) if parent.kind() == "decorated_definition" => named_children(parent)
            .into_iter()
            .filter(|c| c.kind() == "decorator")
            .collect(),
        _ => Vec::new(),
    }
}

/// Dotted name of a decorator, without `@` or call arguments.
#[must_use]
pub fn decorator_name<'s>(decorator: Node<'_>, src: &'s str) -> &'s str {
    let Some(expr) = named_children(decorator).into_iter().next() else {
        return "";
    };
    let target = if expr.kind() == "call" {
        expr.child_by_field_name("function").unwrap_or(expr)
    } else {
        expr
    };
    text(target, src)
}

/// True if the definition carries a decorator whose last segment is `name`.
#[must_use]
pub fn has_decorator(def: Node<'_>, src: &str, name: &str) -> bool {
    decorators(def)
        .into_iter()
        .any(|d| last_segment(decorator_name(d, src)) == name)
}

/// True for `@property`, `@x.setter`, `@x.deleter` and `@cached_property`.
#[must_use]
pub fn is_property(def: Node<'_>, src: &str) -> bool {
    decorators(def).into_iter().any(|d| {
        let name = decorator_name(d, src);
        matches!(
            last_segment(name),
            "property" | "cached_property" | "abstractproperty" | "setter" | "getter" | "deleter"
        )
    })
}

/// The `name` field of a class or function definition.
#[must_use]
pub fn name<'s>(def: Node<'_>, src: &'s str) -> &'s str {
    def.child_by_field_name("name")
        .map_or("", |n| text(n, src))
}

/// True for `async def`.
#[must_use]
pub fn is_async(func: Node<'_>) -> bool {
    let mut cursor = func.walk();
    let result = func.children(&mut cursor).any(|c| c.kind() == "async");
    result
}

/// True for names of the form `__name__`.
#[must_use]
pub fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// Base class names of a class definition, subscripts reduced to their head.
#[must_use]
pub fn superclass_names<'s>(class: Node<'_>, src: &'s str) -> Vec<&'s str> {
    let Some(args) = class.child_by_field_name("superclasses") else {
        return Vec::new();
    };
    named_children(args)
        .into_iter()
        .filter_map(|arg| match arg.kind() {
            "identifier" | "attribute" => Some(text(arg, src)),
            "subscript" => arg.child_by_field_name("value").map(|v| text(v, src)),
            "generic_type" => named_children(arg).first().map(|v| text(*v, src)),
            _ => None,
        })
        .collect()
}

/// True if the class inherits the structural-typing base `Protocol`.
#[must_use]
pub fn is_interface(class: Node<'_>, src: &str) -> bool {
    class.kind() == "class_definition"
        && superclass_names(class, src)
            .into_iter()
            .any(|b| last_segment(b) == "Protocol")
}

/// True if the class looks like an exception type.
#[must_use]
pub fn is_exception_class(class: Node<'_>, src: &str) -> bool {
    superclass_names(class, src).into_iter().any(|b| {
        let base = last_segment(b);
        base == "Exception"
            || base == "BaseException"
            || base.ends_with("Error")
            || base.ends_with("Exception")
    })
}

/// Callables declared directly in a class body.
#[must_use]
pub fn methods(class: Node<'_>) -> Vec<Node<'_>> {
    let Some(block) = body(class) else {
        return Vec::new();
    };
    statements(block)
        .into_iter()
        .map(definition)
        .filter(|d| d.kind() == "function_definition")
        .collect()
}

/// The class a function is directly declared in, if any.
#[must_use]
pub fn enclosing_class(func: Node<'_>) -> Option<Node<'_>> {
    let mut current = func.parent()?;
    if current.kind() == "decorated_definition" {
        current = current.parent()?;
    }
    if current.kind() != "block" {
        return None;
    }
    current.parent().filter(|p| p.kind() == "class_definition")
}

/// True for `if TYPE_CHECKING:` or `if typing.TYPE_CHECKING:`.
#[must_use]
pub fn is_type_checking_guard(if_stmt: Node<'_>, src: &str) -> bool {
    if if_stmt.kind() != "if_statement" {
        return false;
    }
    if_stmt
        .child_by_field_name("condition")
        .filter(|c| matches!(c.kind(), "identifier" | "attribute"))
        .is_some_and(|c| last_segment(text(c, src)) == "TYPE_CHECKING")
}

/// True if the node sits inside the body of a type-checking guard.
#[must_use]
pub fn in_type_checking_block(node: Node<'_>, src: &str) -> bool {
    let mut current = node;
    while let Some(parent) = current.parent() {
        if parent.kind() == "if_statement"
            && is_type_checking_guard(parent, src)
            && parent
                .child_by_field_name("consequence")
                .is_some_and(|c| c.id() == current.id())
        {
            return true;
        }
        current = parent;
    }
    false
}

/// True if the module has `from __future__ import annotations`.
#[must_use]
pub fn has_future_annotations(root: Node<'_>, src: &str) -> bool {
    statements(root)
        .into_iter()
        .filter(|s| s.kind() == "future_import_statement")
        .any(|s| {
            named_children(s)
                .into_iter()
                .any(|n| text(n, src) == "annotations")
        })
}

/// Contents of a plain single-line string literal (`"Name"` or `'Name'`).
///
/// Prefixed, triple-quoted, interpolated and concatenated strings yield `None`.
#[must_use]
pub fn plain_string_value<'s>(node: Node<'_>, src: &'s str) -> Option<&'s str> {
    if node.kind() != "string" {
        return None;
    }
    let raw = text(node, src);
    let quote = raw.chars().next()?;
    if !(quote == '"' || quote == '\'') || raw.len() < 2 || raw.starts_with("\"\"\"") {
        return None;
    }
    if raw.starts_with("'''") || !raw.ends_with(quote) {
        return None;
    }
    let inner = &raw[1..raw.len() - 1];
    if inner.contains(quote) || inner.contains('\\') {
        return None;
    }
    Some(inner)
}

/// Unwraps a `type` node to the expression it wraps.
#[must_use]
pub fn type_expression(node: Node<'_>) -> Node<'_> {
    if node.kind() == "type" {
        named_children(node).first().copied().unwrap_or(node)
    } else {
        node
    }
}

/// Head of a type annotation: `Awaitable` for `Awaitable[int]`,
/// `t.Optional` for `t.Optional[int]`, the full text otherwise.
#[must_use]
pub fn type_head<'s>(node: Node<'_>, src: &'s str) -> &'s str {
    let expr = type_expression(node);
    match expr.kind() {
        "generic_type" => named_children(expr)
            .first()
            .map_or("", |h| text(*h, src)),
        "subscript" => expr
            .child_by_field_name("value")
            .map_or("", |v| text(v, src)),
        _ => text(expr, src),
    }
}

/// Last segment of a dotted name.
#[must_use]
pub fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// True if a class is a pure structural interface.
///
/// The class must inherit `Protocol`, carry `@runtime_checkable` and every
/// callable in it must have a placeholder body.
#[must_use]
pub fn is_pure_interface(class: Node<'_>, src: &str) -> bool {
    is_interface(class, src)
        && has_decorator(class, src, "runtime_checkable")
        && methods(class).into_iter().all(has_placeholder_body)
}
