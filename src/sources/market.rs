//! CoinGecko price adapter
//!
//! Fetches current USD prices for the tracked assets in one call.
//!
//! ## API Reference
//!
//! Endpoint: https://api.coingecko.com/api/v3/simple/price?ids={ids}&vs_currencies=usd
//! Returns: object keyed by asset id, e.g. `{"bitcoin": {"usd": 64250.5}}`
//!
//! An asset missing from the response (delisted, bad id, upstream gap) is
//! skipped for the pass; the remaining assets still produce observations.

use crate::detector::Observation;
use crate::error::RunError;
use crate::sources::PriceSource;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Per-asset quote in the simple-price response.
#[derive(Debug, Deserialize)]
struct AssetQuote {
    usd: Option<f64>,
}

pub struct CoinGeckoSource {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoSource {
    pub fn new() -> Result<Self, RunError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    async fn fetch(&self, assets: &[String]) -> Result<Vec<Observation>, RunError> {
        if assets.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url,
            assets.join(",")
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RunError::SourceUnavailable {
                source_name: "coingecko".to_string(),
                reason: format!("status {}", response.status()),
            });
        }

        let quotes: HashMap<String, AssetQuote> = response.json().await?;
        let observed_at = Utc::now();

        let mut observations = Vec::new();
        for asset in assets {
            match quotes.get(asset).and_then(|q| q.usd) {
                Some(price) => observations.push(Observation {
                    asset_id: asset.clone(),
                    price,
                    observed_at,
                }),
                None => {
                    log::debug!("no price for {} in response, skipping this pass", asset);
                }
            }
        }

        Ok(observations)
    }
}
