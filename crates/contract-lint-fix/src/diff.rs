//! Dry-run rendering of proposed transformations.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;

use contract_lint_core::Transformation;

/// Renders transformations as a diff-style report grouped by file.
///
/// Each file gets a `--- path (N changes)` header followed by one hunk per
/// transformation in source order.
#[must_use]
pub fn render_diff(transformations: &[Transformation]) -> String {
    let mut by_file: BTreeMap<&PathBuf, Vec<&Transformation>> = BTreeMap::new();
    for t in transformations {
        by_file.entry(&t.file).or_default().push(t);
    }

    let mut out = String::new();
    for (file, mut items) in by_file {
        items.sort_by_key(|t| t.start_byte);
        let noun = if items.len() == 1 { "change" } else { "changes" };
        let _ = writeln!(out, "--- {} ({} {noun})", file.display(), items.len());
        for t in items {
            out.push_str(&t.format_diff());
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract_lint_core::TransformKind;

    fn transformation(file: &str, line: usize, original: &str, replacement: &str) -> Transformation {
        Transformation {
            file: PathBuf::from(file),
            line,
            column: 5,
            kind: TransformKind::NullableUnion,
            original_text: original.to_string(),
            replacement_text: replacement.to_string(),
            start_byte: line * 100,
            end_byte: line * 100 + original.len(),
        }
    }

    #[test]
    fn groups_hunks_by_file() {
        let out = render_diff(&[
            transformation("b.py", 3, "Optional[int]", "int | None"),
            transformation("a.py", 7, "Optional[str]", "str | None"),
            transformation("a.py", 2, "Optional[A]", "A | None"),
        ]);
        insta::assert_snapshot!(out.trim_end(), @r"
        --- a.py (2 changes)
        a.py:2:5 [nullable-union]
        - Optional[A]
        + A | None
        a.py:7:5 [nullable-union]
        - Optional[str]
        + str | None

        --- b.py (1 change)
        b.py:3:5 [nullable-union]
        - Optional[int]
        + int | None
        ");
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render_diff(&[]).is_empty());
    }
}
