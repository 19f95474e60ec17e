mod rolecheck;
mod rules;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing_subscriber::EnvFilter;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "seedcheck";
    pub const BIN_NAME: &str = "seedcheck";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Checks the variant rules of curated SEED subsystems against the genomes they describe.")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Show debug messages"),
        )
        .subcommand(rules::cli::create_rules_cli())
        .subcommand(rolecheck::cli::create_rolecheck_cli())
}

///
/// Send log records to stderr. `RUST_LOG` overrides the level chosen here.
///
fn init_logging(matches: &ArgMatches) {
    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // a second subscriber only happens in tests; keep the first
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();
    init_logging(&matches);

    match matches.subcommand() {
        //
        // RULE VALIDATION
        //
        Some((rules::cli::RULES_CMD, matches)) => {
            rules::handlers::run_rules(matches)?;
        }

        //
        // ROLE NAME RE-CHECK
        //
        Some((rolecheck::cli::ROLECHECK_CMD, matches)) => {
            rolecheck::handlers::run_rolecheck(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;

    #[rstest]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_global_verbose_flag() {
        let matches = build_parser()
            .try_get_matches_from(["seedcheck", "rules", "core", "out", "-v"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
    }
}
