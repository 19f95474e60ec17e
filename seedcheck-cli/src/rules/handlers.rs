use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use seedcheck_core::consts::{DEFAULT_ROLE_FILE, FID_TYPES};
use seedcheck_core::utils::prepare_output_dir;
use seedcheck_core::{CoreSeedOrganisms, GenomeCorpus, RoleMap, filtered_subsystem_directories};
use seedcheck_validate::{RuleChecker, ValidationConfig};

use super::cli::DEFAULT_THREADS;

/// Role file from `--roles`, or the default one in the core directory.
pub fn role_file(matches: &ArgMatches, core_dir: &Path) -> PathBuf {
    matches
        .get_one::<String>("roles")
        .map(PathBuf::from)
        .unwrap_or_else(|| core_dir.join(DEFAULT_ROLE_FILE))
}

pub fn run_rules(matches: &ArgMatches) -> Result<()> {
    let core_dir = matches
        .get_one::<String>("core_dir")
        .map(PathBuf::from)
        .context("A CoreSEED directory is required.")?;
    let out_dir = matches
        .get_one::<String>("out_dir")
        .map(PathBuf::from)
        .context("An output directory is required.")?;
    let filter = matches.get_one::<String>("filter").map(PathBuf::from);
    let config = ValidationConfig {
        threads: matches
            .get_one::<usize>("threads")
            .copied()
            .unwrap_or(DEFAULT_THREADS),
        show_progress: !matches.get_flag("no-progress"),
    };

    let roles = role_file(matches, &core_dir);
    info!("Loading role definitions from {:?}.", roles);
    let role_map = RoleMap::load(&roles)?;
    info!("{} role names loaded.", role_map.len());

    let dirs = filtered_subsystem_directories(&core_dir, filter.as_deref())?;
    prepare_output_dir(&out_dir, matches.get_flag("clear"))?;

    let organisms = CoreSeedOrganisms::new(&core_dir)?;
    let corpus = GenomeCorpus::load(&organisms, &FID_TYPES, config.show_progress)
        .context("Failed to load the genome corpus")?;

    let checker = RuleChecker::new(&role_map, &corpus, &out_dir, config)?;
    let summary = checker.run(&dirs)?;

    if let Some(json) = matches.get_one::<String>("json") {
        summary.write_json(Path::new(json))?;
        info!("Run summary written to {}.", json);
    }

    Ok(())
}
