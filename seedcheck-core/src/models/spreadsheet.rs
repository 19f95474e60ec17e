use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fxhash::FxHashSet;
use log::{debug, info, warn};

use crate::consts::{
    CLASSIFICATION_FILE, DEFINITIONS_FILE, EXCHANGABLE_FILE, RULES_FILE, SECTION_MARKER,
    SPREADSHEET_FILE, SUBSYSTEMS_DIR, VERSION_FILE,
};
use crate::errors::SeedDataError;
use crate::utils::{read_first_line, read_name_column, read_text_lossy};

///
/// One column of a subsystem spreadsheet: a role and the abbreviation the rules use for it.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSlot {
    pub abbr: String,
    pub name: String,
}

///
/// Curator ground truth for one genome: the variant code it was assigned.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetRow {
    pub genome_id: String,
    pub variant: String,
}

///
/// The raw contents of a subsystem directory.
///
/// Rule text is kept uncompiled here; the variant crate turns it into predicates.
///
#[derive(Debug, Clone, Default)]
pub struct SubsystemSpreadsheet {
    pub name: String,
    pub roles: Vec<RoleSlot>,
    pub rows: Vec<SpreadsheetRow>,
    pub version: String,
    pub superclass: String,
    pub class: String,
    pub subclass: String,
    pub good: bool,
    pub definitions: String,
    pub rules: String,
}

impl SubsystemSpreadsheet {
    ///
    /// Read a subsystem directory.
    ///
    /// # Arguments
    /// - dir: the subsystem directory; its name encodes the subsystem name
    ///
    pub fn read(dir: &Path) -> Result<Self, SeedDataError> {
        let name = dir_to_name(dir);
        let text = read_text_lossy(&dir.join(SPREADSHEET_FILE))?;
        let mut spreadsheet = Self::parse(&name, &text)?;

        spreadsheet.version = read_optional(&dir.join(VERSION_FILE))?;
        let classification = read_optional(&dir.join(CLASSIFICATION_FILE))?;
        let mut classes = classification.split('\t').map(|s| s.trim().to_string());
        spreadsheet.superclass = classes.next().unwrap_or_default();
        spreadsheet.class = classes.next().unwrap_or_default();
        spreadsheet.subclass = classes.next().unwrap_or_default();
        spreadsheet.good = read_optional(&dir.join(EXCHANGABLE_FILE))? == "1";
        spreadsheet.definitions = read_text(&dir.join(DEFINITIONS_FILE))?;
        spreadsheet.rules = read_text(&dir.join(RULES_FILE))?;

        Ok(spreadsheet)
    }

    ///
    /// Parse the text of a `spreadsheet` file.
    ///
    /// The file has sections separated by `//` lines: role slots, subsets (ignored) and the
    /// genome rows.
    ///
    pub fn parse(name: &str, text: &str) -> Result<Self, SeedDataError> {
        let mut spreadsheet = SubsystemSpreadsheet {
            name: name.to_string(),
            ..Default::default()
        };
        let mut seen_genomes = FxHashSet::default();
        let mut section = 0;

        for (index, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim() == SECTION_MARKER {
                section += 1;
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            let error = |message: &str| SeedDataError::SpreadsheetError {
                subsystem: name.to_string(),
                line: index + 1,
                message: message.to_string(),
            };
            let mut fields = line.split('\t').map(str::trim);
            match section {
                0 => {
                    let abbr = fields.next().unwrap_or_default();
                    let role = fields.next().unwrap_or_default();
                    if abbr.is_empty() || role.is_empty() {
                        return Err(error("role line needs an abbreviation and a role name"));
                    }
                    spreadsheet.roles.push(RoleSlot {
                        abbr: abbr.to_string(),
                        name: role.to_string(),
                    });
                }
                1 => {}
                _ => {
                    let genome_id = fields.next().unwrap_or_default();
                    let variant = fields.next().unwrap_or_default();
                    if genome_id.is_empty() || variant.is_empty() {
                        return Err(error("genome row needs a genome id and a variant code"));
                    }
                    if !seen_genomes.insert(genome_id.to_string()) {
                        debug!("Duplicate row for {} in {} ignored.", genome_id, name);
                        continue;
                    }
                    spreadsheet.rows.push(SpreadsheetRow {
                        genome_id: genome_id.to_string(),
                        variant: variant.to_string(),
                    });
                }
            }
        }

        Ok(spreadsheet)
    }

    /// The good flag as it appears in the reports.
    pub fn good_flag(&self) -> &'static str {
        if self.good { "Y" } else { "" }
    }
}

fn read_optional(path: &Path) -> Result<String, SeedDataError> {
    read_first_line(path).map_err(|e| SeedDataError::FileReadError(format!("{:?}: {}", path, e)))
}

fn read_text(path: &Path) -> Result<String, SeedDataError> {
    if path.is_file() {
        Ok(read_text_lossy(path)?)
    } else {
        Ok(String::new())
    }
}

/// Subsystem name for a subsystem directory.
pub fn dir_to_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
}

/// Directory name for a subsystem name.
pub fn name_to_dir_name(name: &str) -> String {
    name.replace(' ', "_")
}

///
/// List the subsystem directories of a CoreSEED data directory, sorted by name.
///
pub fn subsystem_directories(core_dir: &Path) -> Result<Vec<PathBuf>> {
    let sub_root = core_dir.join(SUBSYSTEMS_DIR);
    if !sub_root.is_dir() {
        return Err(SeedDataError::MissingDirectory(format!(
            "{} has no subsystems directory.",
            core_dir.display()
        ))
        .into());
    }
    let mut dirs = Vec::new();
    for entry in fs::read_dir(&sub_root)
        .with_context(|| format!("Failed to read subsystem directory: {:?}", sub_root))?
    {
        let path = entry?.path();
        if path.join(SPREADSHEET_FILE).is_file() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

///
/// List the subsystem directories, keeping only the subsystems named in a filter file.
///
/// # Arguments
/// - core_dir: the CoreSEED data directory
/// - filter: optional tab-separated file (with header) of subsystem names in the first column
///
pub fn filtered_subsystem_directories(core_dir: &Path, filter: Option<&Path>) -> Result<Vec<PathBuf>> {
    let dirs = subsystem_directories(core_dir)?;
    let Some(filter) = filter else {
        info!("{} subsystems found in {:?}.", dirs.len(), core_dir);
        return Ok(dirs);
    };

    let names = read_name_column(filter)?;
    let dirs: Vec<PathBuf> = dirs
        .into_iter()
        .filter(|dir| names.contains(&dir_to_name(dir)))
        .collect();
    if dirs.len() < names.len() {
        warn!(
            "{} of the {} subsystems named in {:?} were not found.",
            names.len() - dirs.len(),
            names.len(),
            filter
        );
    }
    info!("{} subsystems selected by {:?}.", dirs.len(), filter);
    Ok(dirs)
}
