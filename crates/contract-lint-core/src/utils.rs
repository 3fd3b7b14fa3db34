//! Utility functions for rule implementations.

pub mod allowance;
pub mod nodes;
pub mod paths;

#[doc(inline)]
pub use allowance::{check_allow_with_reason, has_skip_sentinel, AllowCheck};
#[doc(inline)]
pub use paths::module_matches;
