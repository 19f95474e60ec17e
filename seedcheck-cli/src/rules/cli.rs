use clap::{Arg, ArgAction, Command, arg, value_parser};

pub use seedcheck_validate::consts::{DEFAULT_THREADS, RULES_CMD};

pub fn create_rules_cli() -> Command {
    Command::new(RULES_CMD)
        .about("Check every subsystem's variant rules against its spreadsheet and write the reports.")
        .arg(
            Arg::new("core_dir")
                .required(true)
                .help("CoreSEED data directory"),
        )
        .arg(
            Arg::new("out_dir")
                .required(true)
                .help("Directory for the output reports"),
        )
        .arg(arg!(--roles <roles> "Role definition file (default: <core_dir>/subsystem.roles)"))
        .arg(arg!(--filter <filter> "Tab-separated file whose first column names the subsystems to check"))
        .arg(
            Arg::new("clear")
                .long("clear")
                .action(ArgAction::SetTrue)
                .help("Erase the output directory before writing"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .short('t')
                .value_parser(value_parser!(usize))
                .default_value("0")
                .help("Worker threads (0 uses every core)"),
        )
        .arg(
            Arg::new("no-progress")
                .long("no-progress")
                .action(ArgAction::SetTrue)
                .help("Hide the progress bars"),
        )
        .arg(arg!(--json <json> "Write the run summary to this JSON file"))
}
