// src/aggregate.rs
//! Merge, deduplicate, sort and paginate the per-source batches.

use crate::article::Article;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Page size shared by search mode and browse pages past the first.
pub const PAGE_SIZE: usize = 18;
/// Browse page 1 carries one extra slot for the featured article.
pub const BROWSE_FIRST_PAGE_SIZE: usize = PAGE_SIZE + 1;

/// Concatenate batches in adapter order, keeping the first article seen
/// for each link. Earlier adapters win ties on syndicated URLs.
pub fn merge_dedup(batches: Vec<Vec<Article>>) -> Vec<Article> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for batch in batches {
        for article in batch {
            if seen.insert(article.link.clone()) {
                out.push(article);
            }
        }
    }
    out
}

/// Newest first. The sort is stable, so equal timestamps keep merge order
/// and pagination stays reproducible across identical requests.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by_key(|a| Reverse(a.published_instant()));
}

/// Case-insensitive substring filter over headline + summary, applied in
/// search mode after merge/dedup.
pub fn search_filter(articles: Vec<Article>, query: &str) -> Vec<Article> {
    let needle = query.to_lowercase();
    articles
        .into_iter()
        .filter(|a| {
            a.headline.to_lowercase().contains(&needle)
                || a.summary.to_lowercase().contains(&needle)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
}

/// Mode-dependent page geometry.
///
/// Search mode slices uniform 18-article pages. Browse mode gives page 1
/// nineteen slots (slot 0 is the featured article) and every later page
/// eighteen, so browse offsets run 0, 19, 37, 55, ...
pub fn page_window(page: usize, search_mode: bool) -> PageWindow {
    let page = page.max(1);
    if search_mode {
        PageWindow {
            offset: (page - 1) * PAGE_SIZE,
            limit: PAGE_SIZE,
        }
    } else if page == 1 {
        PageWindow {
            offset: 0,
            limit: BROWSE_FIRST_PAGE_SIZE,
        }
    } else {
        PageWindow {
            offset: BROWSE_FIRST_PAGE_SIZE + (page - 2) * PAGE_SIZE,
            limit: PAGE_SIZE,
        }
    }
}

/// Slice one page out of the sorted collection. An offset at or past the
/// end yields an empty page, not an error; `total` is always the pre-slice
/// collection size so clients can compute `hasMore`.
pub fn paginate(articles: Vec<Article>, window: PageWindow) -> (Vec<Article>, usize) {
    let total = articles.len();
    let slice = articles
        .into_iter()
        .skip(window.offset)
        .take(window.limit)
        .collect();
    (slice, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::test_article;

    fn articles(links: &[&str]) -> Vec<Article> {
        links
            .iter()
            .map(|l| test_article(l, "2024-05-01T10:00:00Z"))
            .collect()
    }

    #[test]
    fn merge_keeps_first_seen_per_link() {
        let a = articles(&["https://a/1", "https://a/2"]);
        let mut b = articles(&["https://a/2", "https://b/1"]);
        b[0].source_id = "second".to_string();

        let merged = merge_dedup(vec![a, b]);
        let links: Vec<&str> = merged.iter().map(|a| a.link.as_str()).collect();
        assert_eq!(links, vec!["https://a/1", "https://a/2", "https://b/1"]);
        // the earlier adapter's copy of the duplicate survives
        assert_eq!(merged[1].source_id, "test");
    }

    #[test]
    fn merge_output_has_no_duplicate_links() {
        let merged = merge_dedup(vec![
            articles(&["https://x/1", "https://x/1", "https://x/2"]),
            articles(&["https://x/2", "https://x/3"]),
        ]);
        let mut links: Vec<&str> = merged.iter().map(|a| a.link.as_str()).collect();
        links.sort();
        links.dedup();
        assert_eq!(links.len(), merged.len());
    }

    #[test]
    fn merge_is_idempotent() {
        let input = vec![
            articles(&["https://x/1", "https://x/2", "https://x/1"]),
            articles(&["https://x/2"]),
        ];
        let once = merge_dedup(input);
        let twice = merge_dedup(vec![once.clone()]);
        assert_eq!(once, twice);
    }

    #[test]
    fn sort_is_stable_for_equal_timestamps() {
        let mut set = vec![
            test_article("https://x/old", "2024-01-01T00:00:00Z"),
            test_article("https://x/a", "2024-05-01T10:00:00Z"),
            test_article("https://x/b", "2024-05-01T10:00:00Z"),
            test_article("https://x/c", "2024-05-01T10:00:00Z"),
        ];
        sort_newest_first(&mut set);
        let links: Vec<&str> = set.iter().map(|a| a.link.as_str()).collect();
        assert_eq!(
            links,
            vec!["https://x/a", "https://x/b", "https://x/c", "https://x/old"]
        );
    }

    #[test]
    fn invalid_timestamps_sort_last() {
        let mut set = vec![
            test_article("https://x/bad", "garbage"),
            test_article("https://x/good", "2024-05-01T10:00:00Z"),
        ];
        sort_newest_first(&mut set);
        assert_eq!(set[0].link, "https://x/good");
        assert_eq!(set[1].link, "https://x/bad");
    }

    #[test]
    fn browse_window_geometry() {
        assert_eq!(page_window(1, false), PageWindow { offset: 0, limit: 19 });
        assert_eq!(page_window(2, false), PageWindow { offset: 19, limit: 18 });
        assert_eq!(page_window(3, false), PageWindow { offset: 37, limit: 18 });
    }

    #[test]
    fn search_window_geometry() {
        assert_eq!(page_window(1, true), PageWindow { offset: 0, limit: 18 });
        assert_eq!(page_window(2, true), PageWindow { offset: 18, limit: 18 });
    }

    #[test]
    fn page_zero_is_clamped_to_one() {
        assert_eq!(page_window(0, false), page_window(1, false));
    }

    #[test]
    fn offset_past_end_yields_empty_ok_page() {
        let (slice, total) = paginate(articles(&["https://x/1"]), page_window(5, false));
        assert!(slice.is_empty());
        assert_eq!(total, 1);
    }

    #[test]
    fn browse_pages_cover_the_set_without_gaps_or_overlaps() {
        let links: Vec<String> = (0..61).map(|i| format!("https://x/{i}")).collect();
        let refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let full = articles(&refs);

        let mut reassembled = Vec::new();
        for page in 1.. {
            let (slice, total) = paginate(full.clone(), page_window(page, false));
            assert_eq!(total, 61);
            if slice.is_empty() {
                break;
            }
            reassembled.extend(slice);
        }
        assert_eq!(reassembled, full);
    }

    #[test]
    fn search_pages_cover_the_set_without_gaps_or_overlaps() {
        let links: Vec<String> = (0..40).map(|i| format!("https://x/{i}")).collect();
        let refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let full = articles(&refs);

        let mut reassembled = Vec::new();
        for page in 1.. {
            let (slice, _) = paginate(full.clone(), page_window(page, true));
            if slice.is_empty() {
                break;
            }
            reassembled.extend(slice);
        }
        assert_eq!(reassembled, full);
    }

    #[test]
    fn search_filter_matches_headline_or_summary() {
        let mut set = articles(&["https://x/1", "https://x/2", "https://x/3"]);
        set[0].headline = "Robotics lab expands".to_string();
        set[1].summary = "a robotics breakthrough".to_string();
        set[2].headline = "Unrelated".to_string();
        set[2].summary = "nothing here".to_string();

        let hits = search_filter(set, "Robotics");
        assert_eq!(hits.len(), 2);
    }
}
