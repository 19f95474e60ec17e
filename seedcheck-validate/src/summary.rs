use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

///
/// Findings of one subsystem, as tallied for the main report.
///
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubsystemTally {
    pub rows: usize,
    pub bad_genomes: usize,
    pub bad_variants: usize,
    pub serious: usize,
    pub invalid: usize,
    pub naming_mismatches: usize,
}

///
/// Aggregate counters for a whole rule-check run.
///
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub subsystems: usize,
    pub processed: usize,
    pub failed: usize,
    pub missing_rules: usize,
    pub rows: usize,
    pub bad_genomes: usize,
    pub bad_variants: usize,
    pub serious: usize,
    pub invalid: usize,
    pub naming_mismatches: usize,
    pub elapsed_secs: f64,
}

impl RunSummary {
    /// Summary of one subsystem that was checked.
    pub fn processed(tally: &SubsystemTally, has_rules: bool) -> Self {
        RunSummary {
            subsystems: 1,
            processed: 1,
            missing_rules: usize::from(!has_rules),
            rows: tally.rows,
            bad_genomes: tally.bad_genomes,
            bad_variants: tally.bad_variants,
            serious: tally.serious,
            invalid: tally.invalid,
            naming_mismatches: tally.naming_mismatches,
            ..Default::default()
        }
    }

    /// Summary of one subsystem that could not be loaded.
    pub fn failed() -> Self {
        RunSummary {
            subsystems: 1,
            failed: 1,
            ..Default::default()
        }
    }

    pub fn merge(self, other: RunSummary) -> RunSummary {
        RunSummary {
            subsystems: self.subsystems + other.subsystems,
            processed: self.processed + other.processed,
            failed: self.failed + other.failed,
            missing_rules: self.missing_rules + other.missing_rules,
            rows: self.rows + other.rows,
            bad_genomes: self.bad_genomes + other.bad_genomes,
            bad_variants: self.bad_variants + other.bad_variants,
            serious: self.serious + other.serious,
            invalid: self.invalid + other.invalid,
            naming_mismatches: self.naming_mismatches + other.naming_mismatches,
            elapsed_secs: self.elapsed_secs.max(other.elapsed_secs),
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create summary file: {:?}", path))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
