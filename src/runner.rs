//! Single-pass orchestration
//!
//! One invocation drives exactly one pass: load state, process news,
//! process prices, save state. No internal retries. Per-item and
//! per-source failures are logged and the pass keeps going; an unreadable
//! store or a failed save aborts the pass with the error.
//!
//! The commit ordering on the news path is deliberate: an article id is
//! committed to the seen-set after its delivery attempt completes,
//! whether or not the send succeeded. A flaky delivery therefore drops
//! the article rather than repeating it on every later pass.

use crate::config::Config;
use crate::detector::PriceChangeDetector;
use crate::error::RunError;
use crate::notify::{format_alert, format_news, Notifier};
use crate::sources::{NewsSource, PriceSource};
use crate::store::FileStore;

/// Counters for one pass, logged by the binary when the pass ends.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub news_fetched: usize,
    pub news_already_seen: usize,
    pub news_sent: usize,
    pub news_failed: usize,
    pub observations: usize,
    pub alerts_sent: usize,
    pub alerts_failed: usize,
}

/// Run one full pass. Returns the pass counters, or the fatal error that
/// aborted it (store corruption, failed save).
pub async fn run_pass(
    config: &Config,
    store: &FileStore,
    news: &dyn NewsSource,
    prices: &dyn PriceSource,
    notifier: &dyn Notifier,
) -> Result<PassSummary, RunError> {
    let mut state = store.load()?;
    let mut summary = PassSummary::default();

    // News path: fetch, dedup, deliver one at a time.
    let items = match news.fetch().await {
        Ok(items) => items,
        Err(e) => {
            log::warn!("news source unavailable, skipping news path: {}", e);
            Vec::new()
        }
    };
    summary.news_fetched = items.len();

    let fresh = state.seen.filter_new(&items);
    summary.news_already_seen = items.len() - fresh.len();

    for item in &fresh {
        let text = format_news(item);
        match notifier.send_text(&text).await {
            Ok(()) => {
                summary.news_sent += 1;
                log::info!("sent news: {}", item.link);
            }
            Err(e) => {
                summary.news_failed += 1;
                log::warn!("delivery failed for {}: {}", item.link, e);
            }
        }
        // Committed after the attempt either way; see module docs.
        state.seen.commit(&item.link);
    }

    // Price path: observe each asset, deliver any alerts.
    let mut detector =
        PriceChangeDetector::with_records(config.detector_config(), std::mem::take(&mut state.prices));

    let observations = match prices.fetch(&config.tracked_assets).await {
        Ok(observations) => observations,
        Err(e) => {
            log::warn!("price source unavailable, skipping price path: {}", e);
            Vec::new()
        }
    };
    summary.observations = observations.len();

    for obs in &observations {
        for event in detector.observe(obs) {
            let text = format_alert(&event);
            match notifier.send_text(&text).await {
                Ok(()) => {
                    summary.alerts_sent += 1;
                    log::info!(
                        "sent {} alert for {} ({:+.2}%)",
                        event.kind.as_str(),
                        event.asset_id,
                        event.pct_change
                    );
                }
                Err(e) => {
                    summary.alerts_failed += 1;
                    log::warn!("delivery failed for {} alert: {}", event.asset_id, e);
                }
            }
        }
    }

    state.prices = detector.into_records();
    store.save(&state)?;

    Ok(summary)
}
