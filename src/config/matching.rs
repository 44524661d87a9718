//! Host and user pattern matching
// (c) 2024 Ross Younger

use glob::{MatchOptions, Pattern};
use wildmatch::WildMatch;

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Matches a single glob against the whole of `target`.
///
/// Patterns the `glob` crate refuses (e.g. an unclosed `[`) are retried with
/// `*`/`?`-only wildcard semantics, where brackets are literal.
fn glob_matches(pattern: &str, target: &str) -> bool {
    match Pattern::new(pattern) {
        Ok(p) => p.matches_with(target, GLOB_OPTIONS),
        Err(_) => WildMatch::new(pattern).matches(target),
    }
}

/// Evaluates an ordered list of patterns against `target`.
///
/// A pattern beginning with `!` is negated. If any negated pattern matches,
/// the list does not match, wherever that pattern appears in the list.
/// Otherwise the list matches if any plain pattern does.
pub fn matches<S: AsRef<str>>(patterns: &[S], target: &str) -> bool {
    let mut matched = false;
    for pattern in patterns {
        let pattern = pattern.as_ref();
        if let Some(negated) = pattern.strip_prefix('!') {
            if glob_matches(negated, target) {
                return false;
            }
        } else if glob_matches(pattern, target) {
            matched = true;
        }
    }
    matched
}

/// As [`matches`], for a comma-separated pattern list such as a `Match host` parameter.
pub fn matches_list(list: &str, target: &str) -> bool {
    let patterns: Vec<&str> = list.split(',').collect();
    matches(&patterns, target)
}

///////////////////////////////////////////////////////////////////////////////////////
