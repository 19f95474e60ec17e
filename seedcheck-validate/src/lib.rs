//! # Subsystem rule validation
//!
//! Runs every subsystem's variant rules against the genomes of the corpus and writes the
//! findings to a set of tab-separated reports. Subsystems are checked in parallel; the genome
//! rows of one subsystem are checked in order by a single worker.
//!
pub mod checker;
pub mod consts;
pub mod counts;
pub mod mismatch_log;
pub mod progress;
pub mod reports;
pub mod role_check;
pub mod summary;

// re-exports
pub use checker::*;
pub use counts::*;
pub use mismatch_log::*;
pub use progress::*;
pub use reports::*;
pub use role_check::*;
pub use summary::*;
