//! Item source adapters
//!
//! Thin collaborators that pull candidate items from the outside world:
//! news entries from RSS feeds and price observations from the market
//! API. Each adapter owns its upstream filtering so the core only ever
//! sees well-formed items.

pub mod market;
pub mod rss;

use crate::dedup::NewsItem;
use crate::detector::Observation;
use crate::error::RunError;
use async_trait::async_trait;

/// Supplies candidate news items, keyword-filtered, with non-empty
/// links and titles, in feed order.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<NewsItem>, RunError>;
}

/// Supplies current price observations for the tracked assets. Assets
/// the upstream response does not cover are simply absent from the
/// result; that is missing data, not an error.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, assets: &[String]) -> Result<Vec<Observation>, RunError>;
}

pub use market::CoinGeckoSource;
pub use rss::RssNewsSource;
