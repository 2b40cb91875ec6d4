//! Deduplication of news items against the durable seen-set
//!
//! Each article is identified by its link. The set only ever grows during
//! a run; ids are committed after a delivery attempt and persisted by the
//! store at the end of the pass.

use std::collections::BTreeSet;

/// A candidate news article. The link doubles as the dedup id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub link: String,
    pub title: String,
    /// Summary text carried over from the feed entry, when the feed
    /// provides one. Absent summaries produce a degraded payload.
    pub summary: Option<String>,
}

/// The set of article ids already delivered.
///
/// Backed by a `BTreeSet` so persistence writes ids in sorted order
/// without an extra sort pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeenSet {
    ids: BTreeSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Record an id as delivered. Committing an id that is already
    /// present is a no-op.
    pub fn commit(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    /// Return the subsequence of `items` whose link has not been seen,
    /// preserving input order. Read-only: calling this twice against the
    /// same set yields the same result.
    pub fn filter_new(&self, items: &[NewsItem]) -> Vec<NewsItem> {
        items
            .iter()
            .filter(|item| !self.contains(&item.link))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(|s| s.as_str())
    }
}

impl FromIterator<String> for SeenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_item(link: &str) -> NewsItem {
        NewsItem {
            link: link.to_string(),
            title: format!("title for {}", link),
            summary: None,
        }
    }

    #[test]
    fn test_filter_new_drops_seen_ids() {
        let mut seen = SeenSet::new();
        seen.commit("https://example.com/a");

        let items = vec![
            make_item("https://example.com/a"),
            make_item("https://example.com/b"),
            make_item("https://example.com/c"),
        ];

        let fresh = seen.filter_new(&items);
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh[0].link, "https://example.com/b");
        assert_eq!(fresh[1].link, "https://example.com/c");
    }

    #[test]
    fn test_filter_new_preserves_order() {
        let seen = SeenSet::new();
        let items = vec![
            make_item("https://example.com/z"),
            make_item("https://example.com/a"),
            make_item("https://example.com/m"),
        ];

        let fresh = seen.filter_new(&items);
        let links: Vec<&str> = fresh.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/z",
                "https://example.com/a",
                "https://example.com/m"
            ]
        );
    }

    #[test]
    fn test_filter_new_is_idempotent_read() {
        let mut seen = SeenSet::new();
        seen.commit("https://example.com/a");

        let items = vec![
            make_item("https://example.com/a"),
            make_item("https://example.com/b"),
        ];

        let first = seen.filter_new(&items);
        let second = seen.filter_new(&items);
        assert_eq!(first, second);
    }

    #[test]
    fn test_commit_is_idempotent() {
        let mut seen = SeenSet::new();
        seen.commit("https://example.com/a");
        let after_first = seen.clone();

        seen.commit("https://example.com/a");
        assert_eq!(seen, after_first);
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_iter_is_sorted() {
        let mut seen = SeenSet::new();
        seen.commit("https://example.com/c");
        seen.commit("https://example.com/a");
        seen.commit("https://example.com/b");

        let ids: Vec<&str> = seen.iter().collect();
        assert_eq!(
            ids,
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c"
            ]
        );
    }
}
