//! # Core data access for seedcheck
//!
//! Readers for the pieces of a CoreSEED data directory that the rule checker consumes:
//! the role dictionary, the per-genome functional assignments, and the subsystem
//! spreadsheets. Everything here is loaded once and then shared read-only.
//!
pub mod consts;
pub mod errors;
pub mod models;
pub mod utils;

// re-exports
pub use errors::*;
pub use models::*;
