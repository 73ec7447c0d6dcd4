use std::fmt;

use crate::plex::item::PlexItem;

pub mod matcher;
pub mod selector;

#[derive(Debug)]
pub struct MatchingError;
impl fmt::Display for MatchingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Matching error")
    }
}
impl std::error::Error for MatchingError {}

pub type MatchingResult<T> = error_stack::Result<T, MatchingError>;

/// Outcome of matching one source item against the destination catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Matched(PlexItem),
    Unmatched,
}

/// Reduces a title to trimmed, lowercased alphanumerics-and-spaces. Titles
/// are considered equal for matching iff their normalized forms are equal;
/// punctuation, stray symbols and casing are the usual culprits behind
/// mismatched libraries. Used only for comparison, never for display — the
/// one exception is the fallback search, which queries with the normalized
/// title on purpose to widen recall.
pub fn normalize(source: &str) -> String {
    source
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("The Beatles!"), normalize("the beatles"));
        assert_eq!(normalize("Abbey Road (Remastered)"), "abbey road remastered");
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize("  Help!  "), "help");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = ["The Beatles!", "  Sgt. Pepper's ", "Café del Mar", "", "???"];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_normalize_handles_unicode_and_empty() {
        assert_eq!(normalize("Café del Mar"), "café del mar");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!!"), "");
    }
}
