use colored::Colorize;

use crate::copy::{CopyError, CopyResult};
use crate::matching::matcher::{find_matching_item, Catalog};
use crate::matching::selector::Selector;
use crate::matching::MatchResult;
use crate::plex::item::{PlexItem, SearchKind};
use crate::plex::PlexError;

/// Accumulated outcome of one per-item matching pass, lists in source
/// iteration order.
#[derive(Debug, Default)]
pub struct MatchSummary {
    pub matched: Vec<PlexItem>,
    pub unmatched: Vec<PlexItem>,
    pub skipped: usize,
}

fn print_attempt(number: usize, item: &PlexItem, kind: SearchKind) {
    match kind {
        SearchKind::Track => println!(
            "Attempting to match item #{}:\n\nTitle: {}\nAlbum: {}\nArtist: {}\n",
            number,
            item.title,
            item.parent_title,
            item.grandparent_title.as_deref().unwrap_or("N/A"),
        ),
        SearchKind::Album => println!(
            "Attempting to match item #{}:\n\nTitle: {}\nArtist: {}\n",
            number, item.title, item.parent_title,
        ),
    }
    println!("-----------------------------");
}

/// Runs the matcher over the source items in catalog order.
///
/// In merge mode (`existing_items` present) an item whose exact title is
/// already in the destination is skipped outright and counts as neither
/// matched nor unmatched. A search the server rejects as malformed demotes
/// that one item to unmatched and the pass continues; any other error aborts
/// the run.
pub async fn match_items<C, S>(
    source_items: &[PlexItem],
    catalog: &C,
    selector: &mut S,
    kind: SearchKind,
    existing_items: Option<&[PlexItem]>,
) -> CopyResult<MatchSummary>
where
    C: Catalog + Sync + ?Sized,
    S: Selector + Send,
{
    let mut summary = MatchSummary::default();
    for (index, item) in source_items.iter().enumerate() {
        print_attempt(index + 1, item, kind);

        if let Some(existing) = existing_items {
            if existing.iter().any(|entry| entry.title == item.title) {
                println!("Found existing entry in the destination, skipping item...");
                summary.skipped += 1;
                continue;
            }
        }

        match find_matching_item(item, catalog, selector, kind).await {
            Ok(MatchResult::Matched(candidate)) => summary.matched.push(candidate),
            Ok(MatchResult::Unmatched) => summary.unmatched.push(item.clone()),
            Err(report) => {
                if report.downcast_ref::<PlexError>() == Some(&PlexError::MalformedQuery) {
                    println!(
                        "{}",
                        format!(
                            "The server rejected the search for {}, skipping item",
                            item.title
                        )
                        .red()
                    );
                    summary.unmatched.push(item.clone());
                } else {
                    return Err(report.change_context(CopyError));
                }
            }
        }
    }
    Ok(summary)
}

/// Terminal report, printed even when every item matched.
pub fn report_unmatched(unmatched: &[PlexItem], kind: SearchKind) {
    println!("\n\nThe following items could not be copied:\n");
    for item in unmatched {
        match kind {
            SearchKind::Track => println!(
                "No match for Title: {}, Album: {}, Artist: {}",
                item.title,
                item.parent_title,
                item.grandparent_title.as_deref().unwrap_or("N/A"),
            ),
            SearchKind::Album => println!(
                "No match for Album: {}, Artist: {}",
                item.title, item.parent_title,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::matcher::testing::FakeCatalog;
    use crate::matching::selector::testing::ScriptedSelector;

    fn track(key: &str, title: &str, album: &str) -> PlexItem {
        PlexItem::new(key, title, album, Some("The Beatles".to_string()))
    }

    #[tokio::test]
    async fn test_exact_present_and_fully_absent_items() {
        // Item1 has an exact counterpart; Item2 is absent from the catalog
        // entirely, including the fallback search.
        let item1 = track("s1", "Abbey Road", "The Beatles");
        let item2 = track("s2", "Zzyzx", "Nobody");
        let candidate1 = track("t1", "Abbey Road", "The Beatles");
        let catalog = FakeCatalog::new(vec![("Abbey Road", vec![candidate1.clone()])]);
        let mut selector = ScriptedSelector::new(vec![]);

        let summary = match_items(
            &[item1, item2.clone()],
            &catalog,
            &mut selector,
            SearchKind::Track,
            None,
        )
        .await
        .unwrap();

        assert_eq!(summary.matched, vec![candidate1]);
        assert_eq!(summary.unmatched, vec![item2]);
        assert_eq!(summary.skipped, 0);
        assert_eq!(selector.calls, 0);
    }

    #[tokio::test]
    async fn test_merge_mode_skips_existing_titles() {
        let item = track("s1", "Abbey Road", "The Beatles");
        let existing = vec![track("t9", "Abbey Road", "Some Other Album")];
        let catalog = FakeCatalog::new(vec![]);
        let mut selector = ScriptedSelector::new(vec![]);

        let summary = match_items(
            &[item],
            &catalog,
            &mut selector,
            SearchKind::Track,
            Some(existing.as_slice()),
        )
        .await
        .unwrap();

        // Title-only probe: present means skipped, never re-added and
        // never reported unmatched.
        assert!(summary.matched.is_empty());
        assert!(summary.unmatched.is_empty());
        assert_eq!(summary.skipped, 1);
        assert!(catalog.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_merge_rerun_adds_no_duplicates() {
        let item1 = track("s1", "Abbey Road", "The Beatles");
        let item2 = track("s2", "Zzyzx", "Nobody");
        let candidate1 = track("t1", "Abbey Road", "The Beatles");
        let catalog = FakeCatalog::new(vec![("Abbey Road", vec![candidate1.clone()])]);

        let mut selector = ScriptedSelector::new(vec![]);
        let first_run = match_items(
            &[item1.clone(), item2.clone()],
            &catalog,
            &mut selector,
            SearchKind::Track,
            None,
        )
        .await
        .unwrap();
        assert_eq!(first_run.matched, vec![candidate1]);

        // Second run against a destination that now holds the first run's
        // matches: everything already present is skipped.
        let mut selector = ScriptedSelector::new(vec![]);
        let second_run = match_items(
            &[item1, item2],
            &catalog,
            &mut selector,
            SearchKind::Track,
            Some(first_run.matched.as_slice()),
        )
        .await
        .unwrap();
        assert!(second_run.matched.is_empty());
        assert_eq!(second_run.skipped, 1);
    }

    #[tokio::test]
    async fn test_rejected_query_skips_item_and_continues() {
        let item1 = track("s1", "A".repeat(2000).as_str(), "The Beatles");
        let item2 = track("s2", "B", "The Beatles");
        let catalog = FakeCatalog::rejecting();
        let mut selector = ScriptedSelector::new(vec![]);

        let summary = match_items(
            &[item1.clone(), item2.clone()],
            &catalog,
            &mut selector,
            SearchKind::Track,
            None,
        )
        .await
        .unwrap();

        assert!(summary.matched.is_empty());
        assert_eq!(summary.unmatched, vec![item1, item2]);
    }
}
