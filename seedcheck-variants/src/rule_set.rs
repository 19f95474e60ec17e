use std::collections::BTreeSet;

use fxhash::{FxHashMap, FxHashSet};
use log::debug;

use crate::codes::NO_MATCH;
use crate::errors::RuleParseError;
use crate::parser::{IdentResolver, parse_expression};
use crate::predicate::{Predicate, RoleRef};
use crate::role_sets::RoleSet;

pub const DEFINITIONS_SOURCE: &str = "checkvariant_definitions";
pub const RULES_SOURCE: &str = "checkvariant_rules";

///
/// One rule line: a variant code and the predicate that selects it.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRule {
    pub code: String,
    pub predicate: Predicate,
}

/// Resolves rule identifiers against a subsystem's roles and the definitions seen so far.
struct Scope<'a> {
    roles: &'a [RoleRef],
    definitions: &'a FxHashMap<String, Predicate>,
    bad_ids: &'a mut BTreeSet<String>,
}

impl IdentResolver for Scope<'_> {
    fn resolve(&mut self, ident: &str) -> Predicate {
        if let Some(role) = self.roles.iter().find(|r| r.abbr == ident) {
            return Predicate::Role(role.clone());
        }
        if let Some(definition) = self.definitions.get(ident) {
            return definition.clone();
        }
        if let Some(role) = self.roles.iter().find(|r| r.name == ident) {
            return Predicate::Role(role.clone());
        }
        self.bad_ids.insert(ident.to_string());
        Predicate::Unresolved(ident.to_string())
    }
}

///
/// The compiled rules of one subsystem.
///
/// Rules are kept in declaration order, and prediction returns the code of the first rule
/// whose predicate is satisfied.
///
#[derive(Debug, Clone, Default)]
pub struct VariantRuleSet {
    rules: Vec<VariantRule>,
    codes: FxHashSet<String>,
    bad_ids: BTreeSet<String>,
}

/// Split a rule-file line into its leading name and the expression text.
fn split_head(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    }
}

/// Non-blank, non-comment lines with their 1-based line numbers.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

impl VariantRuleSet {
    ///
    /// Compile a subsystem's definitions and rules.
    ///
    /// # Arguments
    /// - roles: the subsystem's role slots
    /// - definitions: text of the definitions file, lines of `NAME [means] EXPR`
    /// - rules: text of the rules file, lines of `CODE EXPR`
    ///
    pub fn compile(roles: &[RoleRef], definitions: &str, rules: &str) -> Result<Self, RuleParseError> {
        let mut defined: FxHashMap<String, Predicate> = FxHashMap::default();
        let mut rule_set = VariantRuleSet::default();

        for (line, text) in content_lines(definitions) {
            let (name, rest) = split_head(text);
            let expression = match split_head(rest) {
                (keyword, expr) if keyword.eq_ignore_ascii_case("means") => expr,
                _ => rest,
            };
            if expression.is_empty() {
                return Err(RuleParseError::MissingExpression {
                    file: DEFINITIONS_SOURCE.to_string(),
                    line,
                    name: name.to_string(),
                });
            }
            let mut scope = Scope {
                roles,
                definitions: &defined,
                bad_ids: &mut rule_set.bad_ids,
            };
            let predicate = parse_expression(expression, &mut scope).map_err(|message| {
                RuleParseError::Syntax {
                    file: DEFINITIONS_SOURCE.to_string(),
                    line,
                    message,
                }
            })?;
            defined.insert(name.to_string(), predicate);
        }

        for (line, text) in content_lines(rules) {
            let (code, expression) = split_head(text);
            if expression.is_empty() {
                return Err(RuleParseError::MissingExpression {
                    file: RULES_SOURCE.to_string(),
                    line,
                    name: code.to_string(),
                });
            }
            let mut scope = Scope {
                roles,
                definitions: &defined,
                bad_ids: &mut rule_set.bad_ids,
            };
            let predicate = parse_expression(expression, &mut scope).map_err(|message| {
                RuleParseError::Syntax {
                    file: RULES_SOURCE.to_string(),
                    line,
                    message,
                }
            })?;
            rule_set.codes.insert(code.to_string());
            rule_set.rules.push(VariantRule {
                code: code.to_string(),
                predicate,
            });
        }

        debug!(
            "{} rules compiled for {} variant codes, {} bad identifiers.",
            rule_set.rules.len(),
            rule_set.codes.len(),
            rule_set.bad_ids.len()
        );
        Ok(rule_set)
    }

    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty()
    }

    /// True if some rule predicts this code.
    pub fn is_ruled_code(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    ///
    /// Predict the variant code for a role set.
    ///
    /// # Returns
    /// The code of the first satisfied rule in declaration order, or [`NO_MATCH`].
    ///
    pub fn predict(&self, roles: &RoleSet) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.predicate.eval(roles))
            .map(|rule| rule.code.as_str())
            .unwrap_or(NO_MATCH)
    }

    ///
    /// Describe which roles in the rules for a code were found and which were not.
    ///
    /// # Returns
    /// `found, found / missing, missing` over the leaves of every rule for the code, in
    /// order of first appearance. An empty string for a code with no rules.
    ///
    pub fn explain(&self, code: &str, roles: &RoleSet) -> String {
        let mut leaves = Vec::new();
        for rule in self.rules.iter().filter(|rule| rule.code == code) {
            rule.predicate.leaves(&mut leaves);
        }
        if leaves.is_empty() {
            return String::new();
        }

        let mut seen = FxHashSet::default();
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for leaf in leaves {
            let (name, present) = match leaf {
                Predicate::Role(role) => (role.abbr.as_str(), role.is_present(roles)),
                Predicate::Unresolved(name) => (name.as_str(), false),
                _ => continue,
            };
            if !seen.insert(name) {
                continue;
            }
            if present {
                found.push(name);
            } else {
                missing.push(name);
            }
        }

        format!("{} / {}", found.join(", "), missing.join(", "))
    }

    pub fn rules(&self) -> &[VariantRule] {
        &self.rules
    }

    /// Identifiers in the rule text that matched no role or definition.
    pub fn bad_ids(&self) -> &BTreeSet<String> {
        &self.bad_ids
    }

    pub fn bad_id_count(&self) -> usize {
        self.bad_ids.len()
    }
}
