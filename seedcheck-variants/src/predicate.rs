use std::fmt::{self, Display};

use seedcheck_core::RoleId;

use crate::role_sets::RoleSet;

///
/// A subsystem role as the rules see it: the abbreviation used in rule text, the name recorded
/// in the spreadsheet, and the role id that name resolves to (if any).
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRef {
    pub abbr: String,
    pub name: String,
    pub id: Option<RoleId>,
}

impl RoleRef {
    /// True if this role is in the set. A role that never resolved is never present.
    pub fn is_present(&self, roles: &RoleSet) -> bool {
        self.id.as_ref().is_some_and(|id| roles.contains(id))
    }
}

///
/// Boolean expression over role presence, one per variant rule.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Role(RoleRef),
    /// An identifier that names neither a role nor a definition. Never satisfied.
    Unresolved(String),
    Not(Box<Predicate>),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    /// Satisfied when at least `n` members are.
    AtLeast(usize, Vec<Predicate>),
}

impl Predicate {
    ///
    /// Evaluate the predicate against a role set.
    ///
    pub fn eval(&self, roles: &RoleSet) -> bool {
        match self {
            Predicate::Role(role) => role.is_present(roles),
            Predicate::Unresolved(_) => false,
            Predicate::Not(inner) => !inner.eval(roles),
            Predicate::All(members) => members.iter().all(|p| p.eval(roles)),
            Predicate::Any(members) => members.iter().any(|p| p.eval(roles)),
            Predicate::AtLeast(n, members) => {
                members.iter().filter(|p| p.eval(roles)).take(*n).count() >= *n
            }
        }
    }

    ///
    /// Collect the leaves of the predicate, left to right.
    ///
    pub fn leaves<'a>(&'a self, out: &mut Vec<&'a Predicate>) {
        match self {
            Predicate::Role(_) | Predicate::Unresolved(_) => out.push(self),
            Predicate::Not(inner) => inner.leaves(out),
            Predicate::All(members) | Predicate::Any(members) | Predicate::AtLeast(_, members) => {
                for member in members {
                    member.leaves(out);
                }
            }
        }
    }

    fn fmt_member(member: &Predicate, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match member {
            Predicate::All(_) | Predicate::Any(_) => write!(f, "({})", member),
            _ => write!(f, "{}", member),
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Role(role) => write!(f, "{}", role.abbr),
            Predicate::Unresolved(name) => write!(f, "{}", name),
            Predicate::Not(inner) => {
                write!(f, "not ")?;
                Self::fmt_member(inner, f)
            }
            Predicate::All(members) | Predicate::Any(members) => {
                let op = if matches!(self, Predicate::All(_)) { " and " } else { " or " };
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", op)?;
                    }
                    Self::fmt_member(member, f)?;
                }
                Ok(())
            }
            Predicate::AtLeast(n, members) => {
                write!(f, "{} of {{", n)?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", member)?;
                }
                write!(f, "}}")
            }
        }
    }
}
