pub const SUB_REPORT: &str = "subReport.tbl";
pub const BAD_VARIANTS: &str = "badVariants.tbl";
pub const BV_SUMMARY: &str = "bvSummary.tbl";
pub const IV_SUMMARY: &str = "ivSummary.tbl";
pub const MISSING: &str = "missing.tbl";
pub const ERRORS: &str = "errors.tbl";
pub const BAD_IDS: &str = "badIds.tbl";
pub const MISMATCH: &str = "mismatch.tbl";
pub const OLD_CODES: &str = "oldCodes.tbl";

pub const SUB_REPORT_HEADER: &str =
    "Subsystem\troles\tgenomes\tbad_ids\tbad_roles\tbad_variants\tserious\tinvalid\tmismatch\tbad_genomes";
pub const BAD_VARIANTS_HEADER: &str =
    "Subsystem\tgood\tgenome_id\texpected\tactual\texpected_roles\tactual_roles";
pub const BV_SUMMARY_HEADER: &str = "Subsystem\tgood\tbad_ids\texpected\tactual\tcount";
pub const IV_SUMMARY_HEADER: &str = "Subsystem\tgood\tbad_ids\tinvalid\tactual\tcount";
pub const MISSING_HEADER: &str = "Subsystem\tversion\tsuperclass\tclass\tsubclass\tgood";
pub const ERRORS_HEADER: &str = "Subsystem\terror_message";
pub const BAD_IDS_HEADER: &str = "Subsystem\troles\tgood\tbad_ids";
pub const MISMATCH_HEADER: &str = "feature_id\tactual_role\tsubsystem_role";
pub const OLD_CODES_HEADER: &str = "Subsystem\troles\tactive_genomes\tgood\ttotal_codes\told_codes";

pub const ROLE_CHECK_HEADER: &str = "subsystem\trole_id\tfid\tactual\texpected";

pub const RULES_CMD: &str = "rules";
pub const ROLECHECK_CMD: &str = "rolecheck";
pub const DEFAULT_THREADS: usize = 0;
