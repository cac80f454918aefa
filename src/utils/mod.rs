//! Utility functions and helpers.
//!
//! - [`paths`]: Path manipulation (tilde expansion, private directories, tree listing)

/// Path manipulation and resolution utilities
pub mod paths;

pub use paths::expand_tilde;
