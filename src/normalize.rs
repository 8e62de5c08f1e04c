use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hardcoded whitespace regex is valid"));

static STRIPPED_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.,;:!?]").expect("hardcoded punctuation regex is valid"));

/// Canonical form used for every cell comparison.
///
/// Lowercases, trims, collapses whitespace runs to one space and then drops
/// `. , ; : ! ?`. Punctuation is removed after collapsing, so `"a . b"`
/// keeps two spaces.
#[must_use]
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let collapsed = WHITESPACE_RUN.replace_all(lowered.trim(), " ");
    STRIPPED_PUNCTUATION.replace_all(&collapsed, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn lowercases_and_collapses_whitespace() {
        assert_eq!(normalize("  Hello \t  World\n"), "hello world");
    }

    #[test]
    fn strips_only_listed_punctuation() {
        assert_eq!(normalize("Total: 1,000.50!?"), "total 100050");
        assert_eq!(normalize("a-b (c) 'd'"), "a-b (c) 'd'");
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(normalize(" \t "), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn punctuation_removed_after_collapse() {
        assert_eq!(normalize("a . b"), "a  b");
    }
}
