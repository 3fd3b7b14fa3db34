//! # contract-lint-graph
//!
//! Module dependency graph for contract-lint.
//!
//! This crate turns the imports of every analyzed Python file into a directed
//! graph over the analyzed module set and reports dependency cycles:
//!
//! - [`LanguageExtractor`] trait and [`PythonExtractor`] for import extraction
//! - [`ModuleResolver`] for longest-prefix import resolution
//! - [`DependencyGraph`] built once from every file's [`ModuleImports`]
//! - [`find_cycles`] reporting every module that takes part in a cycle

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;

use contract_lint_core::Cycle;
use serde::Serialize;
use thiserror::Error;

pub mod cycles;
pub mod extractor;
pub mod graph;
pub mod resolver;

pub use cycles::find_cycles;
pub use extractor::{ImportInfo, LanguageExtractor, PythonExtractor};
pub use graph::{DependencyEdge, DependencyGraph, ModuleImports};
pub use resolver::{is_package_file, module_name, package_prefix, ModuleResolver};

/// Errors from mapping files onto the module graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A path component is not valid UTF-8.
    #[error("Path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Offending path.
        path: PathBuf,
    },

    /// The path does not name a module.
    #[error("Path does not name a module: {path}")]
    EmptyModule {
        /// Offending path.
        path: PathBuf,
    },
}

/// Graph plus the cycles found in it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportAnalysis {
    /// The dependency graph.
    pub graph: DependencyGraph,
    /// Cycles in deterministic order.
    pub cycles: Vec<Cycle>,
}

/// Builds the graph from every module's imports and detects its cycles.
#[must_use]
pub fn analyze_imports(files: &[ModuleImports], include_type_checking: bool) -> ImportAnalysis {
    let graph = DependencyGraph::build(files, include_type_checking);
    let cycles = find_cycles(&graph);
    ImportAnalysis { graph, cycles }
}
