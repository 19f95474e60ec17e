use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use fxhash::{FxHashMap, FxHashSet};
use regex::Regex;

use crate::errors::SeedDataError;
use crate::models::function::strip_comment;
use crate::utils::lossy_lines;

/// Stable identifier of a canonical role.
pub type RoleId = String;

static EC_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*(?:EC|TC)\s+[^)]*\)").unwrap());
static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

///
/// Compute the lookup key for a role name.
///
/// Comments and EC/TC numbers are removed, case is folded and every run of punctuation or
/// whitespace collapses into a single space.
///
pub fn normalize_role(name: &str) -> String {
    let name = strip_comment(name);
    let name = EC_NUMBER.replace_all(name, " ");
    let name = name.to_lowercase();
    NON_ALPHANUMERIC.replace_all(&name, " ").trim().to_string()
}

///
/// The role dictionary: maps role names and their synonyms to role ids.
///
/// This is the synonym-tolerant half of role identity. Lookups normalize the incoming text, so
/// differences in case, punctuation, comments and EC numbers do not matter here.
///
#[derive(Debug, Default, Clone)]
pub struct RoleMap {
    by_key: FxHashMap<String, RoleId>,
    ids: FxHashSet<RoleId>,
}

impl RoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Load a role definition file.
    ///
    /// Each line is tab-separated with the role id in the first column and a role name in the
    /// last. Repeated ids register synonyms; the first name seen becomes the canonical one.
    ///
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Role definition file {:?} is not found or unreadable.", path))?;
        let reader = BufReader::new(file);
        let mut map = RoleMap::new();

        for (index, line) in lossy_lines(reader).enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let (id, name) = match (fields.first(), fields.last()) {
                (Some(id), Some(name)) if fields.len() >= 2 && !id.trim().is_empty() => {
                    (id.trim(), name.trim())
                }
                _ => {
                    return Err(SeedDataError::RoleDefinitionError {
                        file: path.display().to_string(),
                        line: index + 1,
                        text: line.clone(),
                    }
                    .into());
                }
            };
            map.register(id, name);
        }

        Ok(map)
    }

    ///
    /// Register a name for a role id.
    ///
    /// A name whose key is already taken keeps its original id.
    ///
    pub fn register(&mut self, id: &str, name: &str) {
        let key = normalize_role(name);
        if key.is_empty() {
            return;
        }
        self.by_key.entry(key).or_insert_with(|| id.to_string());
        self.ids.insert(id.to_string());
    }

    /// Resolve free-form role text to a role id, tolerating synonyms and cosmetic differences.
    pub fn resolve(&self, role_text: &str) -> Option<&RoleId> {
        self.by_key.get(&normalize_role(role_text))
    }

    /// Number of distinct role ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for RoleMap {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut map = RoleMap::new();
        for (id, name) in iter {
            map.register(id, name);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::fs;

    #[fixture]
    fn role_map() -> RoleMap {
        RoleMap::from_iter([
            ("FeUpt", "Ferric Uptake Protein"),
            ("FeUpt", "Iron uptake protein A"),
            ("HemA", "Glutamyl-tRNA reductase (EC 1.2.1.70)"),
        ])
    }

    #[rstest]
    #[case("Ferric Uptake Protein", "ferric uptake protein")]
    #[case("Glutamyl-tRNA reductase (EC 1.2.1.70)", "glutamyl trna reductase")]
    #[case("Ferric  uptake, protein # odd", "ferric uptake protein")]
    #[case("Transporter (TC 2.A.1.1.1)", "transporter")]
    fn test_normalize_role(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(normalize_role(name), expected);
    }

    #[rstest]
    fn test_resolve_lenient(role_map: RoleMap) {
        assert_eq!(role_map.resolve("Ferric uptake protein").unwrap(), "FeUpt");
        assert_eq!(role_map.resolve("iron uptake protein A").unwrap(), "FeUpt");
        assert_eq!(role_map.resolve("Glutamyl-tRNA reductase").unwrap(), "HemA");
        assert!(role_map.resolve("ferric-uptake protien").is_none());
    }

    #[rstest]
    fn test_len_counts_ids(role_map: RoleMap) {
        assert_eq!(role_map.len(), 2);
    }

    #[rstest]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subsystem.roles");
        fs::write(&path, "R1\tFirst role\nR2\tabc\tSecond role\n\nR1\tAlias of first\n").unwrap();
        let map = RoleMap::load(&path).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.resolve("second role").unwrap(), "R2");
        assert_eq!(map.resolve("alias of first").unwrap(), "R1");
    }

    #[rstest]
    fn test_load_rejects_single_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subsystem.roles");
        fs::write(&path, "R1\tFirst role\njunk\n").unwrap();
        let err = RoleMap::load(&path).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
