//! # contract-lint-fix
//!
//! Source-to-source rewrites for Python interface files.
//!
//! The tree is never edited in place. [`Proposer`] renders replacement text
//! for the outermost node of each rewrite, [`apply`] splices the replacements
//! into the original text from the end backwards and [`rewrite`] refuses any
//! result that no longer parses. [`write_with_backup`] keeps a copy of the
//! original next to it before swapping the new content in.
//!
//! | Kind | Before | After |
//! |------|--------|-------|
//! | `nullable-union` | `Optional[T]` | `T \| None` |
//! | `multi-arm-union` | `Union[A, B, C]` | `A \| B \| C` |
//! | `forward-reference` | `"User"` | `User` |
//! | `awaitable-wrapping` | `async def f() -> T` | `async def f() -> Awaitable[T]` |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::Path;

use contract_lint_core::{SourceFile, Transformation};

mod apply;
mod diff;
mod propose;
mod render;
mod scope;
mod writer;

pub use apply::{apply, rewrite, TransformError};
pub use diff::render_diff;
pub use propose::Proposer;
pub use writer::{backup_path, write_with_backup, WriteError};

/// Proposed transformations of one file and the text they produce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFix {
    /// Transformations in source order.
    pub transformations: Vec<Transformation>,
    /// Rewritten text, `None` when nothing changes.
    pub rewritten: Option<String>,
}

impl FileFix {
    /// Whether the file changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }
}

/// Proposes the transformations for a parsed file and renders the result.
///
/// # Errors
///
/// Returns an error if the transformations cannot be applied or the rewritten
/// text does not parse.
pub fn fix_source(
    proposer: &Proposer,
    source: &SourceFile,
    file: &Path,
) -> Result<FileFix, TransformError> {
    let transformations = proposer.propose(source, file);
    if transformations.is_empty() {
        return Ok(FileFix::default());
    }
    let rewritten = rewrite(source.text(), &transformations)?;
    Ok(FileFix {
        transformations,
        rewritten: Some(rewritten),
    })
}
