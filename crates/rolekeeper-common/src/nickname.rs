//! Nickname formatting.
//!
//! A rule such as `[MOD] {display_name}` is rendered against a member's current
//! identity. Any leading `[TAG]` already on the display name is dropped first,
//! so a member moving between tagged roles does not pile up tags.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{DISPLAY_NAME_PLACEHOLDER, USERNAME_PLACEHOLDER};

/// Platform ceiling on nickname length, in characters.
pub const MAX_NICKNAME_CHARS: usize = 32;

// "[ANYTHING] " at the very start; only the first tag is removed.
static LEADING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[^\]]+\]\s*").expect("leading tag pattern is valid"));

/// Remove one leading `[TAG]` and surrounding whitespace from a display name.
pub fn strip_leading_tag(display_name: &str) -> &str {
    let rest = match LEADING_TAG.find(display_name) {
        Some(m) => &display_name[m.end()..],
        None => display_name,
    };
    rest.trim()
}

/// Render `format` for a member and truncate it to [`MAX_NICKNAME_CHARS`].
///
/// Truncation may cut through a substituted name; that is accepted.
pub fn format_nickname(format: &str, username: &str, display_name: &str) -> String {
    let stripped = strip_leading_tag(display_name);
    format
        .replace(USERNAME_PLACEHOLDER, username)
        .replace(DISPLAY_NAME_PLACEHOLDER, stripped)
        .chars()
        .take(MAX_NICKNAME_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_exactly_one_leading_tag() {
        assert_eq!(
            format_nickname("[NEW] {display_name}", "rest", "[TAG] Rest"),
            "[NEW] Rest"
        );
        assert_eq!(strip_leading_tag("[A] [B] Rest"), "[B] Rest");
        assert_eq!(strip_leading_tag("Rest [TAG]"), "Rest [TAG]");
    }

    #[test]
    fn empty_brackets_are_not_a_tag() {
        assert_eq!(strip_leading_tag("[] Rest"), "[] Rest");
    }

    #[test]
    fn substitutes_username() {
        assert_eq!(format_nickname("{username}'s Alt", "sam", "Sam!"), "sam's Alt");
    }

    #[test]
    fn output_never_exceeds_the_limit() {
        let long_name = "x".repeat(80);
        let out = format_nickname("[Staff] {display_name} | {username}", "someone", &long_name);
        assert_eq!(out.chars().count(), MAX_NICKNAME_CHARS);
        assert!(out.starts_with("[Staff] xxx"));

        let short = format_nickname("{username}", "bob", "Bob");
        assert_eq!(short, "bob");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let name = "é".repeat(40);
        let out = format_nickname("{display_name}", "u", &name);
        assert_eq!(out.chars().count(), MAX_NICKNAME_CHARS);
    }
}
