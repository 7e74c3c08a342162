/*!
The algebra turning walker paths into parameter names and conditions.

A path is a string over the alphabet `seg (('%'|'@') seg)*`: `%` separates
choice positions and element names, `@n` marks a recursion frame at depth
`n`. The two functions here are pure and are the only source of parameter
identity, so their exact string behavior is what downstream configurators
match byte-for-byte.

*/

use lazy_static::lazy_static;
use regex::Regex;

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

///
/// Derive the two names of the rule at `path`: the canonical key (every
/// `@`, `%`, and `:` stripped) and the user-facing command-line fragment
/// (`:` replaced by `-`).
///
pub fn rule_name(path: &str) -> (String, String) {
    let canonical = path
        .chars()
        .filter(|c| !matches!(c, '@' | '%' | ':'))
        .collect();
    let command_line = path.replace(':', "-");
    (canonical, command_line)
}

///
/// Derive the condition under which the rule at `path` is active: the path
/// of the enclosing choice and the value it must have taken. Both strings
/// are empty when the rule is unconditional.
///
/// For a path ending in `@k` with `k > 0` the condition is that the
/// recursion frame at depth `k - 1` chose the recursive alternative
/// (`rec_index`). Otherwise the trailing `%node_name` is stripped and a
/// remaining `%j` suffix identifies the enclosing categorical's choice.
///
pub fn rule_cond(path: &str, node_name: &str, rec_index: Option<usize>) -> (String, String) {
    let mut condition = path.to_string();
    let mut value = String::new();
    let mut standard_rule = true;

    if let Some(found) = DEPTH_SUFFIX.find(&condition) {
        let depth: usize = condition[found.start() + 1..].parse().unwrap_or(0);
        condition.truncate(found.start());
        if depth > 0 {
            standard_rule = false;
            condition = format!("{}@{}", condition, depth - 1);
            value = rec_index.map(|i| i.to_string()).unwrap_or_default();
        }
    }

    if standard_rule {
        erase_last(&mut condition, &format!("%{node_name}"));
        if let Some(found) = CHOICE_SUFFIX.find(&condition) {
            value = condition[found.start() + 1..].to_string();
            condition.truncate(found.start());
        } else {
            condition.clear();
        }
    }

    (
        condition.trim().to_string(),
        value.trim().to_string(),
    )
}

// ------------------------------------------------------------------------------------------------
// Private Functions
// ------------------------------------------------------------------------------------------------

lazy_static! {
    static ref DEPTH_SUFFIX: Regex = Regex::new(r"@[0-9]+$").unwrap();
    static ref CHOICE_SUFFIX: Regex = Regex::new(r"%[0-9]+$").unwrap();
}

/// Remove the last occurrence of `pattern`, anywhere in `target`.
pub(crate) fn erase_last(target: &mut String, pattern: &str) {
    if pattern.is_empty() {
        return;
    }
    if let Some(at) = target.rfind(pattern) {
        target.replace_range(at..at + pattern.len(), "");
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------
