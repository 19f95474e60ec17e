use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fxhash::FxHashSet;
use log::{error, info};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use seedcheck_core::{GenomeCorpus, RoleId, RoleMap, dir_to_name, roles_of_function};
use seedcheck_variants::{
    Outcome, RoleSetBuilder, Subsystem, classify, is_inactive, is_new_style,
};

use crate::counts::PairCounts;
use crate::progress::ProgressTracker;
use crate::reports::{ReportSink, ReportWriters};
use crate::summary::{RunSummary, SubsystemTally};

///
/// Settings of a rule-check run.
///
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Worker threads; 0 lets rayon decide.
    pub threads: usize,
    pub show_progress: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            threads: 0,
            show_progress: true,
        }
    }
}

///
/// Checks the variant rules of many subsystems against a loaded genome corpus.
///
/// The role dictionary and the corpus are shared read-only by all workers; the report files
/// are shared through one lock each.
///
pub struct RuleChecker<'a> {
    role_map: &'a RoleMap,
    corpus: &'a GenomeCorpus,
    corpus_roles: FxHashSet<RoleId>,
    reports: ReportWriters,
    config: ValidationConfig,
}

///
/// Every role id that occurs in at least one genome of the corpus.
///
fn corpus_role_ids(role_map: &RoleMap, corpus: &GenomeCorpus) -> FxHashSet<RoleId> {
    let genomes: Vec<_> = corpus.iter().map(|(_, functions)| functions).collect();
    genomes
        .par_iter()
        .map(|functions| {
            let mut ids = FxHashSet::default();
            for function in functions.values() {
                for role_text in roles_of_function(function) {
                    if let Some(id) = role_map.resolve(role_text) {
                        ids.insert(id.clone());
                    }
                }
            }
            ids
        })
        .reduce(FxHashSet::default, |mut acc, ids| {
            acc.extend(ids);
            acc
        })
}

fn write_pair_counts(sink: &ReportSink, subsystem: &Subsystem, counts: &PairCounts) -> Result<()> {
    let prefix = format!(
        "{}\t{}\t{}",
        subsystem.name(),
        subsystem.good_flag(),
        subsystem.bad_id_count()
    );
    sink.write_lines(
        counts
            .sorted()
            .into_iter()
            .map(|((expected, actual), count)| {
                format!("{}\t{}\t{}\t{}", prefix, expected, actual, count)
            }),
    )?;
    Ok(())
}

impl<'a> RuleChecker<'a> {
    ///
    /// Create the checker and open every report in the output directory.
    ///
    /// # Arguments
    /// - role_map: the role dictionary
    /// - corpus: the genomes to check, already loaded
    /// - out_dir: existing directory that receives the reports
    /// - config: run settings
    ///
    pub fn new(
        role_map: &'a RoleMap,
        corpus: &'a GenomeCorpus,
        out_dir: &Path,
        config: ValidationConfig,
    ) -> Result<Self> {
        let reports = ReportWriters::open(out_dir)?;
        let corpus_roles = corpus_role_ids(role_map, corpus);
        info!(
            "{} distinct roles found in {} genomes.",
            corpus_roles.len(),
            corpus.len()
        );

        Ok(RuleChecker {
            role_map,
            corpus,
            corpus_roles,
            reports,
            config,
        })
    }

    ///
    /// Check every subsystem directory in parallel.
    ///
    /// A subsystem with malformed rules or spreadsheet is recorded in the error report and
    /// skipped. I/O failures stop the run.
    ///
    pub fn run(&self, subsystem_dirs: &[PathBuf]) -> Result<RunSummary> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .context("Failed to build the worker thread pool")?;
        let progress = ProgressTracker::new(subsystem_dirs.len(), self.config.show_progress);

        info!(
            "Processing {} subsystems with {} threads.",
            subsystem_dirs.len(),
            pool.current_num_threads()
        );
        let mut summary = pool.install(|| {
            subsystem_dirs
                .par_iter()
                .map(|dir| self.analyze_subsystem(dir, &progress))
                .try_reduce(RunSummary::default, |a, b| Ok(a.merge(b)))
        })?;
        progress.finish();
        self.reports.flush_all()?;

        summary.elapsed_secs = progress.elapsed().as_secs_f64();
        info!(
            "{} of {} subsystems processed, {} failed, {} without rules. {} bad variants, {} serious, {} invalid. {} features with role naming drift.",
            summary.processed,
            progress.total(),
            summary.failed,
            summary.missing_rules,
            summary.bad_variants,
            summary.serious,
            summary.invalid,
            self.reports.mismatch.len()
        );
        Ok(summary)
    }

    fn analyze_subsystem(&self, dir: &Path, progress: &ProgressTracker) -> Result<RunSummary> {
        let summary = match Subsystem::load(dir, self.role_map) {
            Ok(subsystem) => self.process_subsystem(&subsystem)?,
            Err(e) if e.is_structural() => {
                error!("Error in {:?}: {}", dir, e);
                self.reports
                    .errors
                    .write_line(&format!("{}\t{}", dir_to_name(dir), e))?;
                RunSummary::failed()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to load subsystem {:?}", dir));
            }
        };
        self.reports.flush_all()?;
        progress.complete_one();
        Ok(summary)
    }

    /// Vocabulary slots that are unresolved or never seen in the corpus.
    fn bad_role_count(&self, subsystem: &Subsystem) -> usize {
        subsystem
            .roles()
            .iter()
            .filter(|role| {
                role.id
                    .as_ref()
                    .is_none_or(|id| !self.corpus_roles.contains(id))
            })
            .count()
    }

    ///
    /// Check one subsystem and write all of its report lines.
    ///
    pub fn process_subsystem(&self, subsystem: &Subsystem) -> Result<RunSummary> {
        let name = subsystem.name();
        let good = subsystem.good_flag();
        let bad_id_count = subsystem.bad_id_count();
        info!("Validating subsystem {}.", name);

        let mut tally = SubsystemTally {
            rows: subsystem.rows().len(),
            ..Default::default()
        };
        let mut active_genomes = 0;
        let mut new_codes = BTreeSet::new();
        let mut old_codes = BTreeSet::new();
        for row in subsystem.rows() {
            if !self.corpus.contains(&row.genome_id) {
                tally.bad_genomes += 1;
            }
            if !is_inactive(&row.variant) {
                active_genomes += 1;
            }
            if is_new_style(&row.variant) {
                new_codes.insert(row.variant.as_str());
            } else {
                old_codes.insert(row.variant.as_str());
            }
        }

        let mut bad_pairs = PairCounts::new();
        let mut invalid_pairs = PairCounts::new();
        let indicators = if !subsystem.has_rules() {
            let sheet = subsystem.spreadsheet();
            self.reports.missing.write_line(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                name, sheet.version, sheet.superclass, sheet.class, sheet.subclass, good
            ))?;
            "\t\t\t".to_string()
        } else {
            let builder = RoleSetBuilder::new(self.role_map);
            let mut details = Vec::new();
            for row in subsystem.rows() {
                let Some(functions) = self.corpus.get(&row.genome_id) else {
                    continue;
                };
                let role_sets = builder.build(subsystem, functions, &self.reports.mismatch)?;
                let record = classify(subsystem, &row.variant, &role_sets);
                match record.outcome {
                    Outcome::Match | Outcome::MissingRules => {}
                    Outcome::Invalid => {
                        tally.invalid += 1;
                        invalid_pairs.count(record.pair_key());
                    }
                    outcome => {
                        tally.bad_variants += 1;
                        bad_pairs.count(record.pair_key());
                        match outcome {
                            Outcome::NamingMismatch => tally.naming_mismatches += 1,
                            Outcome::SeriousMismatch => {
                                tally.serious += 1;
                                details.push(format!(
                                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                                    name,
                                    good,
                                    row.genome_id,
                                    record.expected,
                                    record.actual,
                                    subsystem.explain(&record.expected, &role_sets.lenient),
                                    subsystem.explain(&record.actual, &role_sets.lenient)
                                ));
                            }
                            _ => {}
                        }
                    }
                }
            }
            self.reports.bad_variants.write_lines(details)?;
            info!(
                "{}: {} bad variants, {} serious, {} mismatches, {} invalid.",
                name, tally.bad_variants, tally.serious, tally.naming_mismatches, tally.invalid
            );
            format!(
                "{}\t{}\t{}\t{}",
                tally.bad_variants, tally.serious, tally.invalid, tally.naming_mismatches
            )
        };

        self.reports.main.write_line(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            name,
            subsystem.role_count(),
            tally.rows,
            bad_id_count,
            self.bad_role_count(subsystem),
            indicators,
            tally.bad_genomes
        ))?;

        if !old_codes.is_empty() {
            self.reports.old_codes.write_line(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                name,
                subsystem.role_count(),
                active_genomes,
                good,
                old_codes.len() + new_codes.len(),
                old_codes.into_iter().collect::<Vec<_>>().join(", ")
            ))?;
        }

        write_pair_counts(&self.reports.bv_summary, subsystem, &bad_pairs)?;
        write_pair_counts(&self.reports.iv_summary, subsystem, &invalid_pairs)?;

        if bad_id_count > 0 {
            let bad_ids: Vec<&str> = subsystem
                .rule_set()
                .bad_ids()
                .iter()
                .map(String::as_str)
                .collect();
            self.reports.bad_ids.write_line(&format!(
                "{}\t{}\t{}\t{}",
                name,
                subsystem.role_count(),
                good,
                bad_ids.join(", ")
            ))?;
        }

        Ok(RunSummary::processed(&tally, subsystem.has_rules()))
    }

    pub fn reports(&self) -> &ReportWriters {
        &self.reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use seedcheck_core::{FunctionMap, SubsystemSpreadsheet};
    use std::fs;

    fn iron_subsystem(role_map: &RoleMap) -> Subsystem {
        let sheet = SubsystemSpreadsheet::parse(
            "Iron Transport",
            "FeuA\tFerric Uptake Protein\nFeuB\tFerric Reductase\n//\n//\n100.1\t1\n100.2\t1\n100.3\t0\n",
        )
        .unwrap();
        let sheet = SubsystemSpreadsheet {
            rules: "1 FeuA\n0 not FeuA\n".to_string(),
            ..sheet
        };
        Subsystem::from_spreadsheet(sheet, role_map).unwrap()
    }

    fn genome(functions: &[(&str, &str)]) -> FunctionMap {
        functions
            .iter()
            .map(|(fid, f)| (fid.to_string(), f.to_string()))
            .collect()
    }

    #[fixture]
    fn role_map() -> RoleMap {
        [("R1", "Ferric Uptake Protein"), ("R2", "Ferric Reductase")]
            .into_iter()
            .collect()
    }

    #[rstest]
    fn test_bad_roles_count_unseen_roles(role_map: RoleMap) {
        let mut corpus = GenomeCorpus::default();
        corpus.insert(
            "100.1".to_string(),
            genome(&[("fig|100.1.peg.1", "Ferric uptake protein")]),
        );
        let dir = tempfile::tempdir().unwrap();
        let checker =
            RuleChecker::new(&role_map, &corpus, dir.path(), ValidationConfig::default()).unwrap();
        let subsystem = iron_subsystem(&role_map);
        // FeuB never occurs in the corpus
        assert_eq!(checker.bad_role_count(&subsystem), 1);
    }

    #[rstest]
    fn test_process_subsystem_counts(role_map: RoleMap) {
        let mut corpus = GenomeCorpus::default();
        corpus.insert(
            "100.1".to_string(),
            genome(&[("fig|100.1.peg.1", "Ferric uptake protein")]),
        );
        corpus.insert(
            "100.2".to_string(),
            genome(&[("fig|100.2.peg.1", "ferric-uptake protien")]),
        );
        let dir = tempfile::tempdir().unwrap();
        let checker =
            RuleChecker::new(&role_map, &corpus, dir.path(), ValidationConfig::default()).unwrap();
        let summary = checker
            .process_subsystem(&iron_subsystem(&role_map))
            .unwrap();
        checker.reports().flush_all().unwrap();

        assert_eq!(summary.rows, 3);
        assert_eq!(summary.bad_genomes, 1);
        assert_eq!(summary.bad_variants, 1);
        assert_eq!(summary.serious, 1);
        assert_eq!(summary.invalid, 0);

        let main = fs::read_to_string(dir.path().join(crate::consts::SUB_REPORT)).unwrap();
        assert_eq!(
            main.lines().nth(1).unwrap(),
            "Iron Transport\t2\t3\t0\t1\t1\t1\t0\t0\t1"
        );
        let detail = fs::read_to_string(dir.path().join(crate::consts::BAD_VARIANTS)).unwrap();
        assert_eq!(
            detail.lines().nth(1).unwrap(),
            "Iron Transport\t\t100.2\t1\t0\t / FeuA\t / FeuA"
        );
    }
}
