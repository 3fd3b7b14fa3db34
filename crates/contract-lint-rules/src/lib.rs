//! # contract-lint-rules
//!
//! Built-in lint rules for contract-lint.
//!
//! Each rule visits the node kinds it registers during the analyzer's single
//! tree walk and reports one category of structural problem in Python
//! `Protocol` interface files.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | CL001 | `forbidden-construct` | `__init__`, concrete bodies and literal defaults in interfaces |
//! | CL002 | `forbidden-import` | I/O, process, serialization, logging and networking imports |
//! | CL003 | `naming-pattern` | `Protocol` prefix, `Error` suffix and `@runtime_checkable` |
//! | CL004 | `missing-marker` | `Awaitable[...]` on async callables, async on I/O-named methods |
//! | CL005 | `signature-shape` | Interface method bodies must be `...` |
//! | CL006 | `redundant-naming` | Names restating their context |
//! | CL007 | `vague-naming` | Generic names such as `*Manager` or `process()` |
//!
//! ## Usage
//!
//! ```ignore
//! use contract_lint_core::Analyzer;
//! use contract_lint_rules::{ForbiddenImport, MissingMarker};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./interfaces")
//!     .rule(ForbiddenImport::new())
//!     .rule(MissingMarker::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod forbidden_construct;
pub mod forbidden_import;
pub mod missing_marker;
mod naming;
pub mod naming_pattern;
mod presets;
pub mod redundant_naming;
pub mod signature_shape;
pub mod vague_naming;

pub use forbidden_construct::ForbiddenConstruct;
pub use forbidden_import::ForbiddenImport;
pub use missing_marker::MissingMarker;
pub use naming_pattern::NamingPattern;
pub use presets::{all_rules, minimal_rules, recommended_rules, strict_rules, Preset};
pub use redundant_naming::RedundantNaming;
pub use signature_shape::SignatureShape;
pub use vague_naming::VagueNaming;

/// Re-export core types for convenience.
pub use contract_lint_core::{Rule, Severity, Violation};
