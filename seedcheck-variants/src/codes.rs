use std::sync::LazyLock;

use regex::Regex;

/// Variant code reported when no rule matches.
pub const NO_MATCH: &str = "-1";

/// Codes for a subsystem that is absent or dormant in a genome.
static INACTIVE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:-|0|dirty)").unwrap());

/// The modern variant-code vocabulary; anything else is an old-style code.
static NEW_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:0|-1|dirty.*|likely.*|lookat.*|active.*|inactive.*)$").unwrap()
});

/// True for codes denoting an inactive subsystem (`-…`, `0…`, `dirty…`).
pub fn is_inactive(code: &str) -> bool {
    INACTIVE_CODE.is_match(code)
}

/// True for codes in the modern vocabulary.
pub fn is_new_style(code: &str) -> bool {
    NEW_CODE.is_match(code)
}
