use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use fxhash::FxHashMap;
use log::{debug, info};

use seedcheck_core::consts::{FID_TYPES, SUBSYSTEMS_DIR};
use seedcheck_core::utils::lossy_lines;
use seedcheck_core::{FunctionMap, GenomeSource, RoleMap, name_to_dir_name, roles_of_function};
use seedcheck_variants::Subsystem;

use crate::consts::ROLE_CHECK_HEADER;

/// Counters of a role-name re-check.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoleCheckStats {
    pub rows: usize,
    pub subsystems_loaded: usize,
    pub mismatches: usize,
}

///
/// Re-examines the genomes of a bad-variants report for role text that differs from the
/// subsystem's recorded role names.
///
/// The report is expected to be grouped by subsystem, so only the current subsystem is kept;
/// genomes are cached for the whole run.
///
pub struct RoleNameChecker<'a, S: GenomeSource> {
    source: &'a S,
    subsystems_dir: PathBuf,
    role_map: &'a RoleMap,
    current: Option<(String, Subsystem)>,
    genomes: FxHashMap<String, FunctionMap>,
}

/// Position of a header column, ignoring case.
fn column_index(header: &[&str], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|col| col.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!("Input file has no \"{}\" column.", name))
}

impl<'a, S: GenomeSource> RoleNameChecker<'a, S> {
    pub fn new(source: &'a S, core_dir: &Path, role_map: &'a RoleMap) -> Self {
        RoleNameChecker {
            source,
            subsystems_dir: core_dir.join(SUBSYSTEMS_DIR),
            role_map,
            current: None,
            genomes: FxHashMap::default(),
        }
    }

    fn ensure_subsystem(&mut self, name: &str, stats: &mut RoleCheckStats) -> Result<()> {
        if self.current.as_ref().is_some_and(|(current, _)| current == name) {
            return Ok(());
        }
        let dir = self.subsystems_dir.join(name_to_dir_name(name));
        if !dir.is_dir() {
            return Err(anyhow!("Subsystem \"{}\" not found in {:?}.", name, self.subsystems_dir));
        }
        info!("Loading subsystem {}.", name);
        let subsystem = Subsystem::load(&dir, self.role_map)
            .with_context(|| format!("Failed to load subsystem {}", name))?;
        self.current = Some((name.to_string(), subsystem));
        stats.subsystems_loaded += 1;
        Ok(())
    }

    fn ensure_genome(&mut self, genome_id: &str) -> Result<()> {
        if !self.genomes.contains_key(genome_id) {
            debug!("Loading genome {}.", genome_id);
            let functions = self.source.functions(genome_id, &FID_TYPES)?;
            self.genomes.insert(genome_id.to_string(), functions);
        }
        Ok(())
    }

    ///
    /// Check every row of a bad-variants report.
    ///
    /// # Arguments
    /// - input: the report, header first; needs `Subsystem` and `genome_id` columns
    /// - output: receives `subsystem role_id fid actual expected` lines, header first
    ///
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<RoleCheckStats> {
        let mut lines = lossy_lines(input);
        let header = lines
            .next()
            .ok_or_else(|| anyhow!("Input file is empty."))??;
        let columns: Vec<&str> = header.split('\t').collect();
        let sub_col = column_index(&columns, "subsystem")?;
        let genome_col = column_index(&columns, "genome_id")?;

        writeln!(output, "{}", ROLE_CHECK_HEADER)?;
        let mut stats = RoleCheckStats::default();
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let (Some(sub_name), Some(genome_id)) = (fields.get(sub_col), fields.get(genome_col))
            else {
                return Err(anyhow!("Input line has too few columns: {}", line));
            };
            stats.rows += 1;

            self.ensure_subsystem(sub_name, &mut stats)?;
            self.ensure_genome(genome_id)?;
            let Some((_, subsystem)) = self.current.as_ref() else {
                continue;
            };
            let Some(functions) = self.genomes.get(*genome_id) else {
                continue;
            };

            for (fid, function) in functions {
                for role_text in roles_of_function(function) {
                    let Some(role_id) = subsystem.role_id(role_text, self.role_map) else {
                        continue;
                    };
                    if subsystem.is_exact_role(role_id, role_text) {
                        continue;
                    }
                    let expected = subsystem.expected_role(role_id).unwrap_or_default();
                    writeln!(
                        output,
                        "{}\t{}\t{}\t{}\t{}",
                        sub_name, role_id, fid, role_text, expected
                    )?;
                    stats.mismatches += 1;
                }
            }
        }
        output.flush()?;

        info!(
            "{} rows checked in {} subsystems. {} role mismatches found.",
            stats.rows, stats.subsystems_loaded, stats.mismatches
        );
        Ok(stats)
    }
}
