//! # contract-lint
//!
//! Structural linter and rewriter for Python `Protocol` interface files.
//!
//! This is the facade crate. It re-exports the core types and drives a whole
//! run: discovery, the per-file pipeline on the worker pool, and the
//! graph-wide phase after the join.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use contract_lint::{load_config, run, RunMode, RunOptions};
//!
//! let config = load_config(Path::new("."), None)?;
//! let report = run(RunMode::Scan, Path::new("./interfaces"), config, &RunOptions::default())?;
//! assert!(report.passed());
//! ```
//!
//! ## Suppression
//!
//! A file containing `# contract-lint: skip-file` is neither checked nor
//! rewritten. A single line is exempted with a directive on it or the line
//! above:
//!
//! ```python
//! # contract-lint: allow(forbidden-import) reason="re-exported for callers"
//! import json
//! ```

#![forbid(unsafe_code)]

pub use contract_lint_core::*;

/// Built-in rules and presets.
pub mod rules {
    pub use contract_lint_rules::*;
}

/// Import extraction, the module graph and cycle detection.
pub mod graph {
    pub use contract_lint_graph::*;
}

/// The transformation engine.
pub mod fix {
    pub use contract_lint_fix::*;
}

mod runner;

pub use runner::{
    build_analyzer, find_config, load_config, resolve_preset, run, RunError, RunOptions,
    CONFIG_CANDIDATES,
};
