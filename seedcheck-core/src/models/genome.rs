use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use fxhash::FxHashSet;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use regex::Regex;

use crate::consts::{
    ASSIGNMENTS_FILE, DELETED_FEATURES_FILE, FEATURES_DIR, GENOME_NAME_FILE, ORGANISMS_DIR,
};
use crate::errors::SeedDataError;
use crate::models::function::feature_type;
use crate::utils::{find_plain_or_gz, get_dynamic_reader, lossy_lines, read_first_line};

static GENOME_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\d+$").unwrap());

/// Map of feature ids to functional assignment text.
pub type FunctionMap = BTreeMap<String, String>;

///
/// A repository of genomes and their functional assignments.
///
pub trait GenomeSource {
    /// All genome ids in the repository, sorted.
    fn genome_ids(&self) -> Result<Vec<String>>;

    /// Display name of a genome.
    fn genome_name(&self, genome_id: &str) -> Result<String>;

    /// Functional assignments of the features of the given types.
    fn functions(&self, genome_id: &str, fid_types: &[&str]) -> Result<FunctionMap>;
}

///
/// Genome repository backed by the `Organisms` directory of a CoreSEED data directory.
///
#[derive(Debug, Clone)]
pub struct CoreSeedOrganisms {
    org_dir: PathBuf,
}

impl CoreSeedOrganisms {
    pub fn new(core_dir: &Path) -> Result<Self, SeedDataError> {
        let org_dir = core_dir.join(ORGANISMS_DIR);
        if !org_dir.is_dir() {
            return Err(SeedDataError::MissingDirectory(format!(
                "No organism directory found in {}.",
                core_dir.display()
            )));
        }
        Ok(CoreSeedOrganisms { org_dir })
    }

    fn deleted_features(&self, genome_dir: &Path, fid_types: &[&str]) -> Result<FxHashSet<String>> {
        let mut deleted = FxHashSet::default();
        for fid_type in fid_types {
            let path = genome_dir
                .join(FEATURES_DIR)
                .join(fid_type)
                .join(DELETED_FEATURES_FILE);
            if !path.is_file() {
                continue;
            }
            for line in lossy_lines(get_dynamic_reader(&path)?) {
                let line = line?;
                let fid = line.trim();
                if !fid.is_empty() {
                    deleted.insert(fid.to_string());
                }
            }
        }
        Ok(deleted)
    }
}

impl GenomeSource for CoreSeedOrganisms {
    fn genome_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.org_dir)
            .with_context(|| format!("Failed to read organism directory: {:?}", self.org_dir))?
        {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if GENOME_ID.is_match(name) {
                    ids.push(name.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn genome_name(&self, genome_id: &str) -> Result<String> {
        read_first_line(&self.org_dir.join(genome_id).join(GENOME_NAME_FILE))
    }

    fn functions(&self, genome_id: &str, fid_types: &[&str]) -> Result<FunctionMap> {
        let genome_dir = self.org_dir.join(genome_id);
        let mut functions = FunctionMap::new();
        let Some(path) = find_plain_or_gz(&genome_dir, ASSIGNMENTS_FILE) else {
            debug!("No functional assignments found for {}.", genome_id);
            return Ok(functions);
        };
        let deleted = self.deleted_features(&genome_dir, fid_types)?;

        for line in lossy_lines(get_dynamic_reader(&path)?) {
            let line = line?;
            let Some((fid, function)) = line.split_once('\t') else {
                continue;
            };
            let wanted = feature_type(fid).is_some_and(|t| fid_types.contains(&t));
            if wanted && !deleted.contains(fid) {
                // later assignments override earlier ones
                functions.insert(fid.to_string(), function.trim_end().to_string());
            }
        }

        Ok(functions)
    }
}

///
/// All genomes' function maps, loaded once and shared read-only across subsystem checks.
///
#[derive(Debug, Default)]
pub struct GenomeCorpus {
    genomes: BTreeMap<String, FunctionMap>,
}

impl GenomeCorpus {
    ///
    /// Read every genome of the source into memory.
    ///
    /// # Arguments
    /// - source: the genome repository
    /// - fid_types: feature types to keep
    /// - show_progress: display a progress bar on stderr
    ///
    pub fn load(source: &impl GenomeSource, fid_types: &[&str], show_progress: bool) -> Result<Self> {
        let ids = source.genome_ids()?;
        let pb = if show_progress {
            ProgressBar::new(ids.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} genomes ({eta})")?
                .progress_chars("##-"),
        );

        let mut corpus = GenomeCorpus::default();
        for genome_id in ids {
            let name = source.genome_name(&genome_id)?;
            debug!("Processing role set for {}: {}.", genome_id, name);
            let functions = source
                .functions(&genome_id, fid_types)
                .with_context(|| format!("Failed to read functions for genome {}", genome_id))?;
            debug!("{} functions found in {}.", functions.len(), genome_id);
            corpus.insert(genome_id, functions);
            pb.inc(1);
        }
        pb.finish_and_clear();
        info!("{} genomes loaded.", corpus.len());

        Ok(corpus)
    }

    pub fn insert(&mut self, genome_id: String, functions: FunctionMap) {
        self.genomes.insert(genome_id, functions);
    }

    pub fn get(&self, genome_id: &str) -> Option<&FunctionMap> {
        self.genomes.get(genome_id)
    }

    pub fn contains(&self, genome_id: &str) -> bool {
        self.genomes.contains_key(genome_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FunctionMap)> {
        self.genomes.iter()
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::TempDir;

    #[fixture]
    fn core_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let genome = dir.path().join("Organisms").join("83333.1");
        fs::create_dir_all(genome.join("Features").join("peg")).unwrap();
        fs::write(genome.join("GENOME"), "Escherichia coli K-12\n").unwrap();
        fs::write(
            genome.join("assigned_functions"),
            "fig|83333.1.peg.1\tFerric uptake protein\n\
             fig|83333.1.peg.2\tOld function\n\
             fig|83333.1.peg.2\tNew function\n\
             fig|83333.1.peg.3\tDeleted protein\n\
             fig|83333.1.crispr.1\tCRISPR array\n",
        )
        .unwrap();
        fs::write(
            genome.join("Features").join("peg").join("deleted.features"),
            "fig|83333.1.peg.3\n",
        )
        .unwrap();
        // not a genome directory
        fs::create_dir_all(dir.path().join("Organisms").join("notes")).unwrap();
        dir
    }

    #[rstest]
    fn test_genome_ids(core_dir: TempDir) {
        let organisms = CoreSeedOrganisms::new(core_dir.path()).unwrap();
        assert_eq!(organisms.genome_ids().unwrap(), vec!["83333.1".to_string()]);
        assert_eq!(
            organisms.genome_name("83333.1").unwrap(),
            "Escherichia coli K-12"
        );
    }

    #[rstest]
    fn test_functions_filtering(core_dir: TempDir) {
        let organisms = CoreSeedOrganisms::new(core_dir.path()).unwrap();
        let functions = organisms.functions("83333.1", &["peg", "rna"]).unwrap();
        assert_eq!(functions.len(), 2);
        assert_eq!(functions["fig|83333.1.peg.2"], "New function");
        assert!(!functions.contains_key("fig|83333.1.peg.3"));
        assert!(!functions.contains_key("fig|83333.1.crispr.1"));
    }

    #[rstest]
    fn test_missing_organism_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CoreSeedOrganisms::new(dir.path()).is_err());
    }

    #[rstest]
    fn test_corpus_load(core_dir: TempDir) {
        let organisms = CoreSeedOrganisms::new(core_dir.path()).unwrap();
        let corpus = GenomeCorpus::load(&organisms, &["peg"], false).unwrap();
        assert_eq!(corpus.len(), 1);
        assert!(corpus.contains("83333.1"));
        assert_eq!(corpus.get("83333.1").unwrap().len(), 2);
    }
}
