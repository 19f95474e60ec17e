use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use seedcheck_core::utils::get_dynamic_reader_w_stdin;
use seedcheck_core::{CoreSeedOrganisms, RoleMap};
use seedcheck_validate::RoleNameChecker;

use crate::rules::handlers::role_file;

pub fn run_rolecheck(matches: &ArgMatches) -> Result<()> {
    let core_dir = matches
        .get_one::<String>("core_dir")
        .map(PathBuf::from)
        .context("A CoreSEED directory is required.")?;
    let input = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or("-");

    let roles = role_file(matches, &core_dir);
    let role_map = RoleMap::load(&roles)?;
    info!("{} role names loaded from {:?}.", role_map.len(), roles);

    let organisms = CoreSeedOrganisms::new(&core_dir)?;
    let reader = get_dynamic_reader_w_stdin(input)?;
    let writer: Box<dyn Write> = match matches.get_one::<String>("output") {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output file: {}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let mut checker = RoleNameChecker::new(&organisms, &core_dir, &role_map);
    checker.run(reader, writer)?;

    Ok(())
}
