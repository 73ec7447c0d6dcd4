use colored::Colorize;
use error_stack::ResultExt;

use crate::dialoguer::Dialoguer;
use crate::matching::{MatchingError, MatchingResult};
use crate::plex::item::{PlexItem, SearchKind};

/// Presents candidate matches to the operator and returns the chosen index,
/// or `None` when the operator skips the item. The returned index is NOT
/// range-checked here; callers own that decision.
pub trait Selector {
    fn select(
        &mut self,
        candidates: &[PlexItem],
        prompt: &str,
        kind: SearchKind,
    ) -> MatchingResult<Option<usize>>;
}

fn field(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

/// One display line per candidate, fields fixed per entity kind: playlists
/// match tracks (album and artist shown), collections match albums (artist
/// shown as the parent).
pub fn render_candidate(index: usize, candidate: &PlexItem, kind: SearchKind) -> String {
    match kind {
        SearchKind::Track => format!(
            "     {}: Title: {}, Album: {}, Artist: {}",
            index,
            field(&candidate.title),
            field(&candidate.parent_title),
            field(candidate.grandparent_title.as_deref().unwrap_or("")),
        ),
        SearchKind::Album => format!(
            "     {}: Title: {}, Artist: {}",
            index,
            field(&candidate.title),
            field(&candidate.parent_title),
        ),
    }
}

/// Line-based interactive selector: `n`/`N` cancels, a non-negative integer
/// picks that index, anything else re-prompts.
pub struct PromptSelector;

impl Selector for PromptSelector {
    fn select(
        &mut self,
        candidates: &[PlexItem],
        prompt: &str,
        kind: SearchKind,
    ) -> MatchingResult<Option<usize>> {
        for (index, candidate) in candidates.iter().enumerate() {
            println!("{}", render_candidate(index, candidate, kind));
        }
        println!();
        loop {
            let selection =
                Dialoguer::input(prompt.to_string()).change_context(MatchingError)?;
            let selection = selection.trim().to_string();
            if selection.eq_ignore_ascii_case("n") {
                return Ok(None);
            }
            match selection.parse::<usize>() {
                Ok(index) => return Ok(Some(index)),
                Err(_) => {
                    println!(
                        "{}",
                        format!(
                            "{} is not a valid choice, enter a number or 'n' for none",
                            selection
                        )
                        .red()
                    );
                }
            }
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;

    use super::*;

    /// Deterministic selector for tests: answers from a script, records how
    /// often it was consulted.
    pub struct ScriptedSelector {
        responses: VecDeque<Option<usize>>,
        pub calls: usize,
    }

    impl ScriptedSelector {
        pub fn new(responses: Vec<Option<usize>>) -> Self {
            Self {
                responses: responses.into(),
                calls: 0,
            }
        }
    }

    impl Selector for ScriptedSelector {
        fn select(
            &mut self,
            _candidates: &[PlexItem],
            _prompt: &str,
            _kind: SearchKind,
        ) -> MatchingResult<Option<usize>> {
            self.calls += 1;
            Ok(self.responses.pop_front().unwrap_or(None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_track_candidate_with_artist() {
        let item = PlexItem::new(
            "1",
            "Come Together",
            "Abbey Road",
            Some("The Beatles".to_string()),
        );
        assert_eq!(
            render_candidate(0, &item, SearchKind::Track),
            "     0: Title: Come Together, Album: Abbey Road, Artist: The Beatles"
        );
    }

    #[test]
    fn test_render_missing_fields_as_placeholder() {
        let item = PlexItem::new("1", "Come Together", "", None);
        assert_eq!(
            render_candidate(3, &item, SearchKind::Track),
            "     3: Title: Come Together, Album: N/A, Artist: N/A"
        );
    }

    #[test]
    fn test_render_album_candidate_without_artist_column() {
        let item = PlexItem::new("9", "Abbey Road", "The Beatles", None);
        assert_eq!(
            render_candidate(1, &item, SearchKind::Album),
            "     1: Title: Abbey Road, Artist: The Beatles"
        );
    }
}
