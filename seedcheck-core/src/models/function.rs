use std::sync::LazyLock;

use regex::Regex;

/// A trailing comment starts at whitespace followed by `#` or `!`.
static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+[#!].*$").unwrap());

/// Separators for multi-domain (` / `), multi-function (` @ `) and ambiguous (`; `) assignments.
static ROLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[/@]\s+|\s*;\s+").unwrap());

///
/// Remove the trailing comment, if any, from a functional assignment or role name.
///
pub fn strip_comment(text: &str) -> &str {
    match COMMENT.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

///
/// Split a functional assignment into its constituent role names.
///
/// # Arguments
/// - function: the functional assignment text of a feature
///
/// # Returns
/// The trimmed role names, in order of appearance. Empty pieces are dropped.
///
pub fn roles_of_function(function: &str) -> Vec<&str> {
    let function = strip_comment(function.trim());
    ROLE_SEPARATOR
        .split(function)
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .collect()
}

///
/// Extract the feature type from a feature id, e.g. `peg` from `fig|83333.1.peg.4`.
///
pub fn feature_type(fid: &str) -> Option<&str> {
    let mut parts = fid.rsplit('.');
    parts.next()?;
    parts.next().filter(|t| !t.is_empty())
}
