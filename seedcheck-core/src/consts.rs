pub const ORGANISMS_DIR: &str = "Organisms";
pub const SUBSYSTEMS_DIR: &str = "Subsystems";
pub const DEFAULT_ROLE_FILE: &str = "subsystem.roles";

// organism directory contents
pub const GENOME_NAME_FILE: &str = "GENOME";
pub const ASSIGNMENTS_FILE: &str = "assigned_functions";
pub const FEATURES_DIR: &str = "Features";
pub const DELETED_FEATURES_FILE: &str = "deleted.features";

/// Feature types whose assignments take part in role checking.
pub const FID_TYPES: [&str; 2] = ["peg", "rna"];

// subsystem directory contents
pub const SPREADSHEET_FILE: &str = "spreadsheet";
pub const VERSION_FILE: &str = "VERSION";
pub const CLASSIFICATION_FILE: &str = "CLASSIFICATION";
pub const EXCHANGABLE_FILE: &str = "EXCHANGABLE";
pub const DEFINITIONS_FILE: &str = "checkvariant_definitions";
pub const RULES_FILE: &str = "checkvariant_rules";
pub const SECTION_MARKER: &str = "//";
