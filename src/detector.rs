//! Price-change detection with configurable window thresholds
//!
//! Tracks one reference record per asset and compares every incoming
//! observation against it. Two rules are evaluated independently on the
//! same elapsed time:
//!
//! - **ShortWindow**: elapsed below the short window and the absolute
//!   percentage move at or above the short threshold (a fast spike).
//! - **LongWindow**: elapsed at or past the long window and the absolute
//!   percentage move at or above the long threshold (a sustained move).
//!
//! Both rules can fire on a single observation, or neither. The reference
//! record always advances to the latest observation whether or not an
//! alert fired, so repeated sub-threshold moves reset the comparison
//! baseline each check rather than accumulating against a fixed anchor.
//! That is a known limitation kept for compatibility with the recorded
//! state format, not an accident.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Last known price and check time for one tracked asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub last_price: f64,
    pub last_check_time: DateTime<Utc>,
}

/// A single price reading handed in by the market adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub asset_id: String,
    pub price: f64,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    ShortWindow,
    LongWindow,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::ShortWindow => "short-window",
            AlertKind::LongWindow => "long-window",
        }
    }
}

/// A detected threshold crossing, ready for delivery. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub asset_id: String,
    pub kind: AlertKind,
    pub old_price: f64,
    pub new_price: f64,
    pub pct_change: f64,
    pub elapsed: Duration,
}

/// Window durations and thresholds for the two rules.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub short_window: Duration,
    pub short_threshold_pct: f64,
    pub long_window: Duration,
    pub long_threshold_pct: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            short_window: Duration::hours(4),
            short_threshold_pct: 5.0,
            long_window: Duration::hours(24),
            long_threshold_pct: 10.0,
        }
    }
}

/// Per-asset change detector.
///
/// Seeded with the persisted records at the start of a pass; the updated
/// records are taken back out with [`into_records`](Self::into_records)
/// and handed to the store when the pass ends.
pub struct PriceChangeDetector {
    config: DetectorConfig,
    records: HashMap<String, PriceRecord>,
}

impl PriceChangeDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self::with_records(config, HashMap::new())
    }

    pub fn with_records(config: DetectorConfig, records: HashMap<String, PriceRecord>) -> Self {
        Self { config, records }
    }

    /// Feed one observation through the detector.
    ///
    /// Returns zero, one, or two alert events. The first observation of
    /// an asset only creates its record; there is no baseline to compare
    /// against, so it can never alert. Every later observation advances
    /// the record regardless of whether a rule fired.
    pub fn observe(&mut self, obs: &Observation) -> Vec<AlertEvent> {
        let record = match self.records.get(&obs.asset_id) {
            Some(record) => record.clone(),
            None => {
                log::debug!("first observation for {}, tracking from here", obs.asset_id);
                self.records.insert(
                    obs.asset_id.clone(),
                    PriceRecord {
                        last_price: obs.price,
                        last_check_time: obs.observed_at,
                    },
                );
                return Vec::new();
            }
        };

        let elapsed = obs.observed_at - record.last_check_time;
        if elapsed < Duration::zero() {
            // An observation older than the stored record would move the
            // check time backwards. Ignore it entirely.
            log::warn!(
                "stale observation for {} ({} before last check), ignoring",
                obs.asset_id,
                record.last_check_time
            );
            return Vec::new();
        }

        let pct_change = (obs.price - record.last_price) / record.last_price * 100.0;
        let mut events = Vec::new();

        // A zero stored price makes the percentage non-finite; no rule
        // can meaningfully fire, but the record still advances below.
        if pct_change.is_finite() {
            if elapsed < self.config.short_window
                && pct_change.abs() >= self.config.short_threshold_pct
            {
                events.push(AlertEvent {
                    asset_id: obs.asset_id.clone(),
                    kind: AlertKind::ShortWindow,
                    old_price: record.last_price,
                    new_price: obs.price,
                    pct_change,
                    elapsed,
                });
            }

            if elapsed >= self.config.long_window
                && pct_change.abs() >= self.config.long_threshold_pct
            {
                events.push(AlertEvent {
                    asset_id: obs.asset_id.clone(),
                    kind: AlertKind::LongWindow,
                    old_price: record.last_price,
                    new_price: obs.price,
                    pct_change,
                    elapsed,
                });
            }
        }

        self.records.insert(
            obs.asset_id.clone(),
            PriceRecord {
                last_price: obs.price,
                last_check_time: obs.observed_at,
            },
        );

        events
    }

    pub fn records(&self) -> &HashMap<String, PriceRecord> {
        &self.records
    }

    pub fn into_records(self) -> HashMap<String, PriceRecord> {
        self.records
    }
}
