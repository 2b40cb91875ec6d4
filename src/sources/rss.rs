//! RSS feed adapter
//!
//! Fetches each configured feed over HTTP, parses it with feed-rs, and
//! turns matching entries into [`NewsItem`]s. A feed that fails to fetch
//! or parse is skipped with a warning and the remaining feeds are still
//! consulted, so one dead source never starves the others.
//!
//! Filtering done here, before anything reaches the dedup engine:
//! - entries with an empty link or empty title are dropped;
//! - titles must match at least one configured keyword (case-insensitive
//!   substring; an empty keyword list matches everything);
//! - at most `max_entries_per_feed` entries are taken per feed.

use crate::dedup::NewsItem;
use crate::error::RunError;
use crate::sources::NewsSource;
use async_trait::async_trait;
use feed_rs::model::Feed;
use std::time::Duration;

const DEFAULT_MAX_ENTRIES_PER_FEED: usize = 40;
const SUMMARY_MAX_CHARS: usize = 420;

pub struct RssNewsSource {
    client: reqwest::Client,
    feeds: Vec<String>,
    keywords: Vec<String>,
    max_entries_per_feed: usize,
}

impl RssNewsSource {
    pub fn new(feeds: Vec<String>, keywords: Vec<String>) -> Result<Self, RunError> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (coinflow)")
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            client,
            feeds,
            keywords,
            max_entries_per_feed: DEFAULT_MAX_ENTRIES_PER_FEED,
        })
    }

    async fn fetch_feed(&self, url: &str) -> Result<Vec<NewsItem>, RunError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(RunError::SourceUnavailable {
                source_name: url.to_string(),
                reason: format!("status {}", response.status()),
            });
        }

        let body = response.bytes().await?;
        let feed = feed_rs::parser::parse(body.as_ref()).map_err(|e| RunError::SourceUnavailable {
            source_name: url.to_string(),
            reason: format!("feed parse failed: {}", e),
        })?;

        Ok(items_from_feed(
            &feed,
            &self.keywords,
            self.max_entries_per_feed,
        ))
    }
}

#[async_trait]
impl NewsSource for RssNewsSource {
    async fn fetch(&self) -> Result<Vec<NewsItem>, RunError> {
        let mut items = Vec::new();

        for url in &self.feeds {
            match self.fetch_feed(url).await {
                Ok(mut feed_items) => {
                    log::debug!("{}: {} matching entries", url, feed_items.len());
                    items.append(&mut feed_items);
                }
                Err(e) => {
                    log::warn!("skipping feed {}: {}", url, e);
                }
            }
        }

        Ok(items)
    }
}

/// Convert parsed feed entries into news items, applying the validity
/// and keyword filters.
fn items_from_feed(feed: &Feed, keywords: &[String], max_entries: usize) -> Vec<NewsItem> {
    feed.entries
        .iter()
        .take(max_entries)
        .filter_map(|entry| {
            let title = entry
                .title
                .as_ref()
                .map(|t| t.content.trim().to_string())
                .unwrap_or_default();
            let link = entry
                .links
                .first()
                .map(|l| l.href.trim().to_string())
                .unwrap_or_default();

            if title.is_empty() || link.is_empty() {
                return None;
            }
            if !matches_keywords(&title, keywords) {
                return None;
            }

            let summary = entry
                .summary
                .as_ref()
                .map(|s| clean_summary(&s.content))
                .filter(|s| !s.is_empty());

            Some(NewsItem {
                link,
                title,
                summary,
            })
        })
        .collect()
}

/// Case-insensitive substring match against the keyword list. An empty
/// list means no filtering.
pub fn matches_keywords(title: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let lower = title.to_lowercase();
    keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
}

/// Collapse whitespace and truncate the feed-provided summary.
fn clean_summary(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, SUMMARY_MAX_CHARS)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push('…');
    truncated
}
