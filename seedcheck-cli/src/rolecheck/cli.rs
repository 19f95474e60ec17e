use clap::{Arg, Command, arg};

pub use seedcheck_validate::consts::ROLECHECK_CMD;

pub fn create_rolecheck_cli() -> Command {
    Command::new(ROLECHECK_CMD)
        .about("List the role names in bad-variant genomes that differ from their subsystem's names.")
        .arg(
            Arg::new("core_dir")
                .required(true)
                .help("CoreSEED data directory"),
        )
        .arg(arg!(--roles <roles> "Role definition file (default: <core_dir>/subsystem.roles)"))
        .arg(
            arg!(-i --input <input> "Bad-variants report to check (`-` for stdin)")
                .default_value("-"),
        )
        .arg(arg!(-o --output <output> "Output file (default: stdout)"))
}
