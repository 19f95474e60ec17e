use std::path::Path;

use fxhash::FxHashMap;
use seedcheck_core::{RoleId, RoleMap, SpreadsheetRow, SubsystemSpreadsheet, strip_comment};

use crate::errors::{RuleParseError, SubsystemLoadError};
use crate::predicate::RoleRef;
use crate::role_sets::RoleSet;
use crate::rule_set::VariantRuleSet;

///
/// A subsystem ready for rule checking: its spreadsheet, the role vocabulary resolved through
/// the role dictionary, and its compiled rules.
///
/// Immutable once loaded, so it can be shared freely while genomes are evaluated.
///
#[derive(Debug, Clone)]
pub struct Subsystem {
    spreadsheet: SubsystemSpreadsheet,
    roles: Vec<RoleRef>,
    vocabulary: FxHashMap<RoleId, String>,
    rule_set: VariantRuleSet,
}

impl Subsystem {
    ///
    /// Load and compile the subsystem in a directory.
    ///
    pub fn load(dir: &Path, role_map: &RoleMap) -> Result<Self, SubsystemLoadError> {
        let spreadsheet = SubsystemSpreadsheet::read(dir)?;
        Ok(Self::from_spreadsheet(spreadsheet, role_map)?)
    }

    ///
    /// Resolve the role slots of a spreadsheet and compile its rules.
    ///
    pub fn from_spreadsheet(
        spreadsheet: SubsystemSpreadsheet,
        role_map: &RoleMap,
    ) -> Result<Self, RuleParseError> {
        let roles: Vec<RoleRef> = spreadsheet
            .roles
            .iter()
            .map(|slot| RoleRef {
                abbr: slot.abbr.clone(),
                name: slot.name.clone(),
                id: role_map.resolve(&slot.name).cloned(),
            })
            .collect();

        let mut vocabulary = FxHashMap::default();
        for role in &roles {
            if let Some(id) = &role.id {
                vocabulary
                    .entry(id.clone())
                    .or_insert_with(|| role.name.clone());
            }
        }

        let rule_set = VariantRuleSet::compile(&roles, &spreadsheet.definitions, &spreadsheet.rules)?;

        Ok(Subsystem {
            spreadsheet,
            roles,
            vocabulary,
            rule_set,
        })
    }

    pub fn name(&self) -> &str {
        &self.spreadsheet.name
    }

    pub fn spreadsheet(&self) -> &SubsystemSpreadsheet {
        &self.spreadsheet
    }

    pub fn rows(&self) -> &[SpreadsheetRow] {
        &self.spreadsheet.rows
    }

    pub fn roles(&self) -> &[RoleRef] {
        &self.roles
    }

    /// Number of role slots (spreadsheet columns).
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    pub fn good_flag(&self) -> &'static str {
        self.spreadsheet.good_flag()
    }

    pub fn rule_set(&self) -> &VariantRuleSet {
        &self.rule_set
    }

    ///
    /// Leniently resolve role text to a role id of this subsystem.
    ///
    /// # Returns
    /// `None` when the text is unknown to the dictionary or names a role outside the
    /// subsystem; neither is an error.
    ///
    pub fn role_id<'m>(&self, role_text: &str, role_map: &'m RoleMap) -> Option<&'m RoleId> {
        role_map
            .resolve(role_text)
            .filter(|id| self.vocabulary.contains_key(*id))
    }

    ///
    /// Strict role identity: the text must equal the subsystem's recorded name for the role.
    ///
    pub fn is_exact_role(&self, role_id: &str, role_text: &str) -> bool {
        self.vocabulary
            .get(role_id)
            .is_some_and(|recorded| recorded.trim() == strip_comment(role_text).trim())
    }

    /// The subsystem's recorded name for a role id.
    pub fn expected_role(&self, role_id: &str) -> Option<&str> {
        self.vocabulary.get(role_id).map(String::as_str)
    }

    pub fn has_rules(&self) -> bool {
        self.rule_set.has_rules()
    }

    pub fn is_ruled_code(&self, code: &str) -> bool {
        self.rule_set.is_ruled_code(code)
    }

    pub fn predict(&self, roles: &RoleSet) -> &str {
        self.rule_set.predict(roles)
    }

    pub fn explain(&self, code: &str, roles: &RoleSet) -> String {
        self.rule_set.explain(code, roles)
    }

    pub fn bad_id_count(&self) -> usize {
        self.rule_set.bad_id_count()
    }

    /// Role slots whose recorded name is unknown to the role dictionary.
    pub fn unresolved_roles(&self) -> impl Iterator<Item = &RoleRef> {
        self.roles.iter().filter(|role| role.id.is_none())
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
            ("FeR", "Ferric reductase"),
        ])
    }

    #[rstest]
    fn test_vocabulary_and_identity(role_map: RoleMap) {
        let mut ss = SubsystemSpreadsheet::parse(
            "Iron Transport",
            "A\tFerric Uptake Protein\nR\tferric reductase\nX\tMystery protein\n//\n//\n83333.1\t1\n",
        )
        .unwrap();
        ss.rules = "1 A\n0 not A\n".to_string();
        let sub = Subsystem::from_spreadsheet(ss, &role_map).unwrap();

        assert_eq!(sub.role_count(), 3);
        assert_eq!(sub.unresolved_roles().count(), 1);
        assert_eq!(sub.role_id("ferric uptake protein", &role_map).unwrap(), "FeUpt");
        assert!(sub.role_id("Mystery protein", &role_map).is_none());

        assert!(sub.is_exact_role("FeUpt", "Ferric Uptake Protein"));
        assert!(sub.is_exact_role("FeUpt", "Ferric Uptake Protein # with a comment"));
        assert!(!sub.is_exact_role("FeUpt", "Ferric uptake protein"));
        // the recorded text is the subsystem's, not the dictionary's
        assert!(sub.is_exact_role("FeR", "ferric reductase"));
        assert!(!sub.is_exact_role("FeR", "Ferric reductase"));
        assert_eq!(sub.expected_role("FeR"), Some("ferric reductase"));

        assert!(sub.has_rules());
        assert!(sub.is_ruled_code("0"));
    }

    #[rstest]
    fn test_load_directory_with_bad_rules(role_map: RoleMap) {
        let dir = tempfile::tempdir().unwrap();
        let sub_dir = dir.path().join("Iron_Transport");
        fs::create_dir_all(&sub_dir).unwrap();
        fs::write(sub_dir.join("spreadsheet"), "A\tFerric Uptake Protein\n").unwrap();
        fs::write(sub_dir.join("checkvariant_rules"), "1 (A\n").unwrap();

        let err = Subsystem::load(&sub_dir, &role_map).unwrap_err();
        assert!(err.is_structural());

        fs::write(sub_dir.join("checkvariant_rules"), "1 A\n").unwrap();
        let sub = Subsystem::load(&sub_dir, &role_map).unwrap();
        assert_eq!(sub.name(), "Iron Transport");
    }

    #[rstest]
    fn test_missing_spreadsheet_is_not_structural(role_map: RoleMap) {
        let dir = tempfile::tempdir().unwrap();
        let err = Subsystem::load(dir.path(), &role_map).unwrap_err();
        assert!(!err.is_structural());
    }
}
