//! # contract-lint-core
//!
//! Core framework for linting Python interface declarations on top of the
//! `tree-sitter` syntax tree.
//!
//! This crate provides the foundational types for the engine:
//!
//! - [`SourceFile`] and [`classify`] for the source model and documentation spans
//! - [`Rule`] trait for per-node rule visitors
//! - [`Analyzer`] for discovery and the single-walk rule dispatch
//! - [`Violation`], [`Transformation`] and [`Cycle`] records
//! - [`RunReport`] for aggregation and the run verdict
//!
//! ## Example
//!
//! ```ignore
//! use contract_lint_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./interfaces")
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod report;
mod rule;
mod source;
mod types;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{sort_violations, Analyzer, AnalyzerBuilder, AnalyzerError, LoadOutcome};
pub use config::{
    AnalyzerConfig, Config, ConfigError, FixConfig, GraphConfig, RuleConfig,
    DEFAULT_BACKUP_SUFFIX, DEFAULT_SKIP_SENTINEL,
};
pub use context::{detect_test_file, module_id, FileContext};
pub use report::{aggregate, RunMode, RunReport, RunSummary};
pub use rule::{Rule, RuleBox};
pub use source::{
    classify, parse_tree, python_language, DocOwner, DocumentationSpan, SourceError, SourceFile,
};
pub use types::{
    Category, Cycle, FileIssue, IssueKind, LintResult, Location, Replacement, Severity,
    Suggestion, Transformation, TransformKind, Violation, ViolationDiagnostic,
};
pub use utils::allowance::AllowCheck;

/// Re-export of the tree-sitter crate for rule implementations.
pub use tree_sitter;
