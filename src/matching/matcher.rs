use async_trait::async_trait;
use colored::Colorize;
use error_stack::ResultExt;

use crate::matching::selector::Selector;
use crate::matching::{normalize, MatchResult, MatchingError, MatchingResult};
use crate::plex::item::{PlexItem, SearchKind};
use crate::plex::PlexResult;

/// Every catalog search is bounded to this many results, same cap for the
/// exact and the fallback query.
pub const SEARCH_RESULT_CAP: u32 = 100;

/// The destination catalog's search capability. Implemented by a whole
/// server (playlist copies) and by one library section (collection copies);
/// tests substitute a canned catalog.
#[async_trait]
pub trait Catalog {
    async fn search(&self, query: &str, kind: SearchKind, limit: u32)
        -> PlexResult<Vec<PlexItem>>;
}

fn selection_prompt(kind: SearchKind) -> &'static str {
    match kind {
        SearchKind::Track => "Select matching track number or 'n' to skip the track",
        SearchKind::Album => "Select matching album number or 'n' to skip the album",
    }
}

/// Finds the destination counterpart of one source item.
///
/// Searches with the exact source title first and takes the first result
/// whose normalized title and parent title both equal the source's; catalog
/// order is authoritative, so the scan is first-wins rather than best-wins.
/// With no exact match, a second search with the *normalized* title gathers
/// loose candidates for the operator to pick from. An out-of-range pick
/// re-runs the selector rather than indexing blindly.
pub async fn find_matching_item<C, S>(
    source_item: &PlexItem,
    catalog: &C,
    selector: &mut S,
    kind: SearchKind,
) -> MatchingResult<MatchResult>
where
    C: Catalog + Sync + ?Sized,
    S: Selector + Send,
{
    println!("\nSearching for items on the target server...");
    let candidates = catalog
        .search(&source_item.title, kind, SEARCH_RESULT_CAP)
        .await
        .change_context(MatchingError)?;

    for candidate in &candidates {
        if normalize(&candidate.title) == normalize(&source_item.title)
            && normalize(&candidate.parent_title) == normalize(&source_item.parent_title)
        {
            println!(
                "Found exact match: {}, {}",
                candidate.title.green(),
                candidate.parent_title.green()
            );
            return Ok(MatchResult::Matched(candidate.clone()));
        }
    }

    let candidates = catalog
        .search(&normalize(&source_item.title), kind, SEARCH_RESULT_CAP)
        .await
        .change_context(MatchingError)?;
    if candidates.is_empty() {
        println!(
            "{}",
            format!("No match found for {}", source_item.title).yellow()
        );
        return Ok(MatchResult::Unmatched);
    }

    println!("No exact match found, but these are very similar:\n");
    loop {
        let selection = selector.select(&candidates, selection_prompt(kind), kind)?;
        match selection {
            None => {
                println!("Skipping this item...\n");
                return Ok(MatchResult::Unmatched);
            }
            Some(index) if index < candidates.len() => {
                let matched = candidates[index].clone();
                println!(
                    "Adding {}, {}",
                    matched.title.green(),
                    matched.parent_title.green()
                );
                return Ok(MatchResult::Matched(matched));
            }
            Some(index) => {
                println!(
                    "{}",
                    format!(
                        "{} is out of range, pick one of the listed numbers",
                        index
                    )
                    .red()
                );
            }
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use error_stack::Report;

    use super::*;
    use crate::plex::PlexError;

    /// Canned catalog for tests: results keyed by the exact query string,
    /// with every received query recorded.
    pub struct FakeCatalog {
        responses: HashMap<String, Vec<PlexItem>>,
        pub queries: Mutex<Vec<String>>,
        reject_queries: bool,
    }

    impl FakeCatalog {
        pub fn new(responses: Vec<(&str, Vec<PlexItem>)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(query, items)| (query.to_string(), items))
                    .collect(),
                queries: Mutex::new(vec![]),
                reject_queries: false,
            }
        }

        pub fn rejecting() -> Self {
            Self {
                responses: HashMap::new(),
                queries: Mutex::new(vec![]),
                reject_queries: true,
            }
        }
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn search(
            &self,
            query: &str,
            _kind: SearchKind,
            _limit: u32,
        ) -> PlexResult<Vec<PlexItem>> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.reject_queries {
                return Err(Report::new(PlexError::MalformedQuery));
            }
            Ok(self.responses.get(query).cloned().unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeCatalog;
    use super::*;
    use crate::matching::selector::testing::ScriptedSelector;

    fn track(key: &str, title: &str, album: &str) -> PlexItem {
        PlexItem::new(key, title, album, Some("The Beatles".to_string()))
    }

    #[tokio::test]
    async fn test_exact_match_is_first_wins() {
        let source = track("src", "Come Together", "Abbey Road");
        let first = track("a", "Come Together", "Abbey Road");
        let second = track("b", "Come Together", "Abbey Road");
        let catalog = FakeCatalog::new(vec![(
            "Come Together",
            vec![first.clone(), second.clone()],
        )]);
        let mut selector = ScriptedSelector::new(vec![]);

        let result = find_matching_item(&source, &catalog, &mut selector, SearchKind::Track)
            .await
            .unwrap();
        assert_eq!(result, MatchResult::Matched(first));
        assert_eq!(selector.calls, 0);
    }

    #[tokio::test]
    async fn test_exact_match_ignores_case_and_punctuation() {
        let source = track("src", "Come Together", "Abbey Road");
        let candidate = track("a", "come together!", "ABBEY ROAD");
        let catalog = FakeCatalog::new(vec![("Come Together", vec![candidate.clone()])]);
        let mut selector = ScriptedSelector::new(vec![]);

        let result = find_matching_item(&source, &catalog, &mut selector, SearchKind::Track)
            .await
            .unwrap();
        assert_eq!(result, MatchResult::Matched(candidate));
    }

    #[tokio::test]
    async fn test_empty_fallback_skips_the_selector() {
        let source = track("src", "Zzyzx", "Nobody");
        let catalog = FakeCatalog::new(vec![]);
        let mut selector = ScriptedSelector::new(vec![Some(0)]);

        let result = find_matching_item(&source, &catalog, &mut selector, SearchKind::Track)
            .await
            .unwrap();
        assert_eq!(result, MatchResult::Unmatched);
        assert_eq!(selector.calls, 0);
        // The fallback query uses the normalized title.
        let queries = catalog.queries.lock().unwrap();
        assert_eq!(*queries, vec!["Zzyzx".to_string(), "zzyzx".to_string()]);
    }

    #[tokio::test]
    async fn test_operator_cancel_means_unmatched() {
        let source = track("src", "Come Together", "Abbey Road");
        let candidate = track("a", "Come Together (Live)", "Abbey Road");
        let catalog =
            FakeCatalog::new(vec![("come together", vec![candidate])]);
        let mut selector = ScriptedSelector::new(vec![None]);

        let result = find_matching_item(&source, &catalog, &mut selector, SearchKind::Track)
            .await
            .unwrap();
        assert_eq!(result, MatchResult::Unmatched);
        assert_eq!(selector.calls, 1);
    }

    #[tokio::test]
    async fn test_operator_pick_returns_that_candidate() {
        let source = track("src", "Come Together", "Abbey Road");
        let first = track("a", "Come Together (Live)", "Abbey Road");
        let second = track("b", "Come Together (Remix)", "Abbey Road");
        let catalog = FakeCatalog::new(vec![(
            "come together",
            vec![first, second.clone()],
        )]);
        let mut selector = ScriptedSelector::new(vec![Some(1)]);

        let result = find_matching_item(&source, &catalog, &mut selector, SearchKind::Track)
            .await
            .unwrap();
        assert_eq!(result, MatchResult::Matched(second));
    }

    #[tokio::test]
    async fn test_out_of_range_pick_reprompts() {
        let source = track("src", "Come Together", "Abbey Road");
        let only = track("a", "Come Together (Live)", "Abbey Road");
        let catalog = FakeCatalog::new(vec![("come together", vec![only.clone()])]);
        let mut selector = ScriptedSelector::new(vec![Some(9), Some(0)]);

        let result = find_matching_item(&source, &catalog, &mut selector, SearchKind::Track)
            .await
            .unwrap();
        assert_eq!(result, MatchResult::Matched(only));
        assert_eq!(selector.calls, 2);
    }
}
