use std::fmt::{self, Display};

use crate::codes::is_inactive;
use crate::role_sets::RoleSets;
use crate::subsystem::Subsystem;

///
/// How a predicted variant compares with the curator's.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The subsystem has no rules; nothing was predicted.
    MissingRules,
    Match,
    /// The expected code has no rule, so no prediction could have produced it.
    Invalid,
    /// The rules would have matched if the genome used the subsystem's exact role names.
    NamingMismatch,
    /// A mismatch that is not worth a detail line: the subsystem has bad rule identifiers, or
    /// both codes are inactive.
    Mismatch,
    /// A genuine rule defect.
    SeriousMismatch,
}

impl Outcome {
    /// True for every outcome counted as a bad variant.
    pub fn is_bad_variant(&self) -> bool {
        matches!(
            self,
            Outcome::NamingMismatch | Outcome::Mismatch | Outcome::SeriousMismatch
        )
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::MissingRules => "missing_rules",
            Outcome::Match => "match",
            Outcome::Invalid => "invalid",
            Outcome::NamingMismatch => "mismatch_naming",
            Outcome::Mismatch => "mismatch",
            Outcome::SeriousMismatch => "mismatch_serious",
        };
        write!(f, "{}", s)
    }
}

///
/// Result of comparing the expected and predicted variants of one genome in one subsystem.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRecord {
    pub expected: String,
    pub actual: String,
    pub outcome: Outcome,
}

impl ClassificationRecord {
    /// Key used to group mismatches in the summary reports.
    pub fn pair_key(&self) -> (String, String) {
        (self.expected.clone(), self.actual.clone())
    }
}

///
/// Classify one genome's variant assignment.
///
/// # Arguments
/// - subsystem: the subsystem and its rules
/// - expected: the curator's variant code for the genome
/// - role_sets: the genome's lenient and strict role sets for this subsystem
///
pub fn classify(subsystem: &Subsystem, expected: &str, role_sets: &RoleSets) -> ClassificationRecord {
    let record = |actual: &str, outcome| ClassificationRecord {
        expected: expected.to_string(),
        actual: actual.to_string(),
        outcome,
    };

    if !subsystem.has_rules() {
        return record("", Outcome::MissingRules);
    }

    let actual = subsystem.predict(&role_sets.lenient);
    if actual == expected {
        return record(actual, Outcome::Match);
    }
    if !subsystem.is_ruled_code(expected) {
        return record(actual, Outcome::Invalid);
    }
    if subsystem.predict(&role_sets.strict) == expected {
        return record(actual, Outcome::NamingMismatch);
    }
    if subsystem.bad_id_count() > 0 || (is_inactive(expected) && is_inactive(actual)) {
        return record(actual, Outcome::Mismatch);
    }
    record(actual, Outcome::SeriousMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::role_sets::{DiscardMismatches, RoleSetBuilder};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use seedcheck_core::{FunctionMap, RoleMap, SubsystemSpreadsheet};

    #[fixture]
    fn role_map() -> RoleMap {
        RoleMap::from_iter([
            ("FeUpt", "Ferric Uptake Protein"),
            ("FeR", "Ferric reductase"),
        ])
    }

    fn iron_transport(role_map: &RoleMap, rules: &str) -> Subsystem {
        let mut ss = SubsystemSpreadsheet::parse(
            "Iron Transport",
            "A\tFerric Uptake Protein\nR\tFerric reductase\n",
        )
        .unwrap();
        ss.rules = rules.to_string();
        Subsystem::from_spreadsheet(ss, role_map).unwrap()
    }

    fn role_sets(role_map: &RoleMap, sub: &Subsystem, functions: &[&str]) -> RoleSets {
        let functions: FunctionMap = functions
            .iter()
            .enumerate()
            .map(|(i, f)| (format!("fig|1.1.peg.{}", i + 1), f.to_string()))
            .collect();
        RoleSetBuilder::new(role_map)
            .build(sub, &functions, &DiscardMismatches)
            .unwrap()
    }

    #[rstest]
    fn test_synonym_resolved_match(role_map: RoleMap) {
        let sub = iron_transport(&role_map, "1 A\n0 not A\n");
        let sets = role_sets(&role_map, &sub, &["Ferric uptake protein"]);
        let rec = classify(&sub, "1", &sets);
        assert_eq!(rec.outcome, Outcome::Match);
        assert_eq!(rec.actual, "1");
    }

    #[rstest]
    fn test_typo_is_serious(role_map: RoleMap) {
        let sub = iron_transport(&role_map, "1 A\n0 not A\n");
        let sets = role_sets(&role_map, &sub, &["ferric-uptake protien"]);
        let rec = classify(&sub, "1", &sets);
        assert_eq!(rec.actual, "0");
        assert_eq!(rec.outcome, Outcome::SeriousMismatch);
        assert!(rec.outcome.is_bad_variant());
    }

    #[rstest]
    fn test_unruled_expected_is_invalid(role_map: RoleMap) {
        let sub = iron_transport(&role_map, "1 A\n0 not A\n");
        let sets = role_sets(&role_map, &sub, &[]);
        let rec = classify(&sub, "-1", &sets);
        assert_eq!(rec.actual, "0");
        assert_eq!(rec.outcome, Outcome::Invalid);
        assert_eq!(rec.pair_key(), ("-1".to_string(), "0".to_string()));
    }

    #[rstest]
    #[case(&[], "-1", Outcome::Match)]
    #[case(&["Ferric Uptake Protein"], "1", Outcome::Invalid)]
    fn test_unruled_no_match_code(
        role_map: RoleMap,
        #[case] functions: &[&str],
        #[case] actual: &str,
        #[case] outcome: Outcome,
    ) {
        // the equality check comes before the ruled-code check
        let sub = iron_transport(&role_map, "1 A\n");
        let sets = role_sets(&role_map, &sub, functions);
        let rec = classify(&sub, "-1", &sets);
        assert_eq!(rec.actual, actual);
        assert_eq!(rec.outcome, outcome);
    }

    #[rstest]
    fn test_naming_mismatch(role_map: RoleMap) {
        // variant 1 needs the reductase to be absent, variant 2 needs it present
        let sub = iron_transport(&role_map, "2 A and R\n1 A\n");
        let sets = role_sets(
            &role_map,
            &sub,
            &["Ferric Uptake Protein", "ferric reductase"],
        );
        let rec = classify(&sub, "1", &sets);
        assert_eq!(rec.actual, "2");
        assert_eq!(rec.outcome, Outcome::NamingMismatch);
        assert_eq!(sub.predict(&sets.strict), "1");
    }

    #[rstest]
    fn test_inactive_pair_is_not_serious(role_map: RoleMap) {
        let sub = iron_transport(&role_map, "0 not A\n-1 A\n");
        let sets = role_sets(&role_map, &sub, &[]);
        let rec = classify(&sub, "-1", &sets);
        assert_eq!(rec.actual, "0");
        assert_eq!(rec.outcome, Outcome::Mismatch);
    }

    #[rstest]
    fn test_bad_ids_downgrade(role_map: RoleMap) {
        let sub = iron_transport(&role_map, "1 A and Zz\n0 not A\n");
        let sets = role_sets(&role_map, &sub, &["Ferric Uptake Protein"]);
        let rec = classify(&sub, "1", &sets);
        assert_eq!(rec.actual, "-1");
        assert_eq!(rec.outcome, Outcome::Mismatch);
    }

    #[rstest]
    fn test_missing_rules(role_map: RoleMap) {
        let sub = iron_transport(&role_map, "");
        let sets = role_sets(&role_map, &sub, &["Ferric Uptake Protein"]);
        assert_eq!(classify(&sub, "1", &sets).outcome, Outcome::MissingRules);
    }

    #[rstest]
    fn test_outcome_display() {
        assert_eq!(Outcome::SeriousMismatch.to_string(), "mismatch_serious");
        assert!(!Outcome::Invalid.is_bad_variant());
    }
}
