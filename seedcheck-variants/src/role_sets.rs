use std::io;

use fxhash::FxHashSet;
use seedcheck_core::{FunctionMap, RoleId, RoleMap, roles_of_function};

use crate::subsystem::Subsystem;

///
/// Role ids present in a genome, restricted to one subsystem's vocabulary.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(FxHashSet<RoleId>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: RoleId) -> bool {
        self.0.insert(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn is_subset(&self, other: &RoleSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<RoleId> for RoleSet {
    fn from_iter<T: IntoIterator<Item = RoleId>>(iter: T) -> Self {
        RoleSet(iter.into_iter().collect())
    }
}

///
/// The two role sets of one genome for one subsystem.
///
/// `lenient` resolves roles through the synonym dictionary; `strict` additionally requires the
/// genome's text to equal the subsystem's recorded role name. `strict` is always a subset of
/// `lenient`.
///
#[derive(Debug, Clone, Default)]
pub struct RoleSets {
    pub lenient: RoleSet,
    pub strict: RoleSet,
}

///
/// Receives features whose role text resolves to a subsystem role but is spelled differently
/// from the subsystem's recorded name.
///
pub trait NamingMismatchLog: Sync {
    fn record(&self, feature_id: &str, observed: &str, recorded: &str) -> io::Result<()>;
}

/// A mismatch log that drops everything.
pub struct DiscardMismatches;

impl NamingMismatchLog for DiscardMismatches {
    fn record(&self, _feature_id: &str, _observed: &str, _recorded: &str) -> io::Result<()> {
        Ok(())
    }
}

///
/// Builds the lenient and strict role sets of a genome for a subsystem.
///
pub struct RoleSetBuilder<'a> {
    role_map: &'a RoleMap,
}

impl<'a> RoleSetBuilder<'a> {
    pub fn new(role_map: &'a RoleMap) -> Self {
        RoleSetBuilder { role_map }
    }

    ///
    /// Compute both role sets.
    ///
    /// # Arguments
    /// - subsystem: the subsystem whose vocabulary scopes the sets
    /// - functions: the genome's feature id to functional assignment map
    /// - mismatches: where naming mismatches are reported
    ///
    pub fn build(
        &self,
        subsystem: &Subsystem,
        functions: &FunctionMap,
        mismatches: &dyn NamingMismatchLog,
    ) -> io::Result<RoleSets> {
        let mut sets = RoleSets::default();

        for (fid, function) in functions {
            for role_text in roles_of_function(function) {
                let Some(role_id) = subsystem.role_id(role_text, self.role_map) else {
                    continue;
                };
                sets.lenient.insert(role_id.clone());
                if subsystem.is_exact_role(role_id, role_text) {
                    sets.strict.insert(role_id.clone());
                } else if let Some(recorded) = subsystem.expected_role(role_id) {
                    mismatches.record(fid, role_text, recorded)?;
                }
            }
        }

        Ok(sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use seedcheck_core::SubsystemSpreadsheet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<(String, String, String)>>);

    impl NamingMismatchLog for Collect {
        fn record(&self, feature_id: &str, observed: &str, recorded: &str) -> io::Result<()> {
            self.0.lock().unwrap().push((
                feature_id.to_string(),
                observed.to_string(),
                recorded.to_string(),
            ));
            Ok(())
        }
    }

    #[fixture]
    fn role_map() -> RoleMap {
        RoleMap::from_iter([
            ("FeUpt", "Ferric Uptake Protein"),
            ("FeR", "Ferric reductase"),
            ("Other", "Unrelated protein"),
        ])
    }

    #[fixture]
    fn subsystem(role_map: RoleMap) -> Subsystem {
        let ss = SubsystemSpreadsheet::parse(
            "Iron Transport",
            "A\tFerric Uptake Protein\nR\tFerric reductase\n",
        )
        .unwrap();
        Subsystem::from_spreadsheet(ss, &role_map).unwrap()
    }

    fn functions(pairs: &[(&str, &str)]) -> FunctionMap {
        pairs
            .iter()
            .map(|(f, t)| (f.to_string(), t.to_string()))
            .collect()
    }

    #[rstest]
    fn test_exact_text_lands_in_both_sets(role_map: RoleMap, subsystem: Subsystem) {
        let log = Collect::default();
        let sets = RoleSetBuilder::new(&role_map)
            .build(
                &subsystem,
                &functions(&[("fig|1.1.peg.1", "Ferric Uptake Protein")]),
                &log,
            )
            .unwrap();
        assert!(sets.lenient.contains("FeUpt"));
        assert!(sets.strict.contains("FeUpt"));
        assert!(log.0.lock().unwrap().is_empty());
    }

    #[rstest]
    fn test_synonym_text_is_lenient_only(role_map: RoleMap, subsystem: Subsystem) {
        let log = Collect::default();
        let sets = RoleSetBuilder::new(&role_map)
            .build(
                &subsystem,
                &functions(&[
                    ("fig|1.1.peg.1", "Ferric uptake protein"),
                    ("fig|1.1.peg.2", "Unrelated protein / Ferric reductase"),
                ]),
                &log,
            )
            .unwrap();
        assert!(sets.lenient.contains("FeUpt"));
        assert!(!sets.strict.contains("FeUpt"));
        assert!(sets.strict.contains("FeR"));
        // out-of-vocabulary roles are ignored
        assert!(!sets.lenient.contains("Other"));
        assert!(sets.strict.is_subset(&sets.lenient));
        assert_eq!(
            *log.0.lock().unwrap(),
            vec![(
                "fig|1.1.peg.1".to_string(),
                "Ferric uptake protein".to_string(),
                "Ferric Uptake Protein".to_string()
            )]
        );
    }

    #[rstest]
    fn test_unknown_text_is_in_neither(role_map: RoleMap, subsystem: Subsystem) {
        let sets = RoleSetBuilder::new(&role_map)
            .build(
                &subsystem,
                &functions(&[("fig|1.1.peg.1", "ferric-uptake protien")]),
                &DiscardMismatches,
            )
            .unwrap();
        assert!(sets.lenient.is_empty());
        assert!(sets.strict.is_empty());
    }
}
