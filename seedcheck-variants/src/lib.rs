//! # Variant rules for SEED subsystems
//!
//! A subsystem's rules predict, from the roles present in a genome, which variant of the
//! subsystem the genome implements. This crate compiles the rule text into predicate trees,
//! builds the lenient and strict role sets of a genome, and classifies disagreements between
//! the predicted variant and the one a curator recorded in the spreadsheet.
//!
pub mod classifier;
pub mod codes;
pub mod errors;
pub mod parser;
pub mod predicate;
pub mod role_sets;
pub mod rule_set;
pub mod subsystem;

// re-exports
pub use classifier::*;
pub use codes::*;
pub use errors::*;
pub use predicate::*;
pub use role_sets::*;
pub use rule_set::*;
pub use subsystem::*;
