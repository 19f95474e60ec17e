pub mod function;
pub mod genome;
pub mod role_map;
pub mod spreadsheet;

// re-export for cleaner imports
pub use self::function::{feature_type, roles_of_function, strip_comment};
pub use self::genome::{CoreSeedOrganisms, FunctionMap, GenomeCorpus, GenomeSource};
pub use self::role_map::{RoleId, RoleMap, normalize_role};
pub use self::spreadsheet::{
    RoleSlot, SpreadsheetRow, SubsystemSpreadsheet, dir_to_name, filtered_subsystem_directories,
    name_to_dir_name, subsystem_directories,
};
