//! Applying transformations to source text.

use contract_lint_core::{parse_tree, SourceError, Transformation};
use thiserror::Error;

/// Errors raised while rewriting a file's text.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A transformation's range lies outside the text or splits a character.
    #[error("transformation at {line}:{column} has an invalid range {start}..{end}")]
    InvalidRange {
        /// Line of the transformation.
        line: usize,
        /// Column of the transformation.
        column: usize,
        /// Range start.
        start: usize,
        /// Range end.
        end: usize,
    },

    /// The text at a transformation's range is not what was proposed against.
    #[error("transformation at {line}:{column} expected `{expected}` but found `{found}`")]
    Stale {
        /// Line of the transformation.
        line: usize,
        /// Column of the transformation.
        column: usize,
        /// Recorded original text.
        expected: String,
        /// Text currently at the range.
        found: String,
    },

    /// Two transformations touch the same bytes.
    #[error("transformations at {first} and {second} overlap")]
    Overlap {
        /// Line of the earlier transformation.
        first: usize,
        /// Line of the later transformation.
        second: usize,
    },

    /// The rewritten text no longer parses.
    #[error("rewritten source does not parse: {0}")]
    Reparse(#[source] SourceError),
}

/// Applies transformations to `text`, highest offset first.
///
/// Every range is checked against the original text before anything is
/// replaced, so a failed call leaves nothing half-applied.
///
/// # Errors
///
/// Returns an error if a range is invalid, stale or overlaps another.
pub fn apply(text: &str, transformations: &[Transformation]) -> Result<String, TransformError> {
    let mut ordered: Vec<&Transformation> = transformations.iter().collect();
    ordered.sort_by(|a, b| b.start_byte.cmp(&a.start_byte).then(b.end_byte.cmp(&a.end_byte)));

    let mut floor = usize::MAX;
    let mut floor_line = 0;
    let mut floor_is_insertion = false;
    for t in &ordered {
        let found = text
            .get(t.start_byte..t.end_byte)
            .ok_or(TransformError::InvalidRange {
                line: t.line,
                column: t.column,
                start: t.start_byte,
                end: t.end_byte,
            })?;
        if found != t.original_text {
            return Err(TransformError::Stale {
                line: t.line,
                column: t.column,
                expected: t.original_text.clone(),
                found: found.to_string(),
            });
        }
        let is_insertion = t.start_byte == t.end_byte;
        // Two insertions at one offset have no defined order.
        let clash = t.end_byte > floor || (is_insertion && floor_is_insertion && t.start_byte == floor);
        if floor != usize::MAX && clash {
            return Err(TransformError::Overlap {
                first: t.line,
                second: floor_line,
            });
        }
        floor = t.start_byte;
        floor_line = t.line;
        floor_is_insertion = is_insertion;
    }

    let mut out = text.to_string();
    for t in ordered {
        out.replace_range(t.start_byte..t.end_byte, &t.replacement_text);
    }
    Ok(out)
}

/// Applies transformations and checks that the result still parses.
///
/// # Errors
///
/// Returns an error if [`apply`] fails or the rewritten text has syntax errors.
pub fn rewrite(text: &str, transformations: &[Transformation]) -> Result<String, TransformError> {
    let rewritten = apply(text, transformations)?;
    parse_tree(&rewritten).map_err(TransformError::Reparse)?;
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract_lint_core::TransformKind;
    use std::path::PathBuf;

    fn edit(text: &str, start: usize, end: usize, replacement: &str) -> Transformation {
        Transformation {
            file: PathBuf::from("t.py"),
            line: 1,
            column: start + 1,
            kind: TransformKind::NullableUnion,
            original_text: text[start..end].to_string(),
            replacement_text: replacement.to_string(),
            start_byte: start,
            end_byte: end,
        }
    }

    #[test]
    fn applies_from_the_end() {
        let text = "a: Optional[int]\nb: Optional[str]\n";
        let ts = vec![edit(text, 3, 16, "int | None"), edit(text, 20, 33, "str | None")];
        insta::assert_snapshot!(apply(text, &ts).expect("apply").trim_end(), @r"
        a: int | None
        b: str | None
        ");
    }

    #[test]
    fn insertion_at_start() {
        let text = "x = 1\n";
        let ts = vec![edit(text, 0, 0, "import y\n"), edit(text, 4, 5, "2")];
        assert_eq!(apply(text, &ts).expect("apply"), "import y\nx = 2\n");
    }

    #[test]
    fn rejects_overlap_and_stale_text() {
        let text = "value: Optional[int]\n";
        let overlapping = vec![edit(text, 7, 20, "int | None"), edit(text, 16, 19, "str")];
        assert!(matches!(
            apply(text, &overlapping),
            Err(TransformError::Overlap { .. })
        ));

        let mut stale = edit(text, 7, 20, "int | None");
        stale.original_text = "Union[int]".to_string();
        assert!(matches!(apply(text, &[stale]), Err(TransformError::Stale { .. })));

        let out_of_range = edit(text, 7, 20, "x");
        let shifted = Transformation {
            start_byte: 40,
            end_byte: 44,
            ..out_of_range
        };
        assert!(matches!(
            apply(text, &[shifted]),
            Err(TransformError::InvalidRange { .. })
        ));
    }

    #[test]
    fn broken_output_is_refused() {
        let text = "def f(x: int) -> None: ...\n";
        let ts = vec![edit(text, 9, 12, "int |")];
        assert!(matches!(rewrite(text, &ts), Err(TransformError::Reparse(_))));
    }
}
