//! Crate-wide error type
//!
//! One enum covers the four failure classes the runner distinguishes:
//! fatal configuration problems, per-source fetch failures, per-message
//! delivery failures, and unreadable persisted state. The runner recovers
//! locally from the middle two and aborts the pass on the others.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    /// A required credential or target is absent. Raised before any I/O.
    #[error("missing required configuration: {name}")]
    ConfigMissing { name: &'static str },

    /// A feed or price API call failed. The failing source is skipped
    /// for this pass; the pass continues.
    #[error("source unavailable ({source_name}): {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// A single notification call failed. Logged, never retried.
    #[error("delivery failed: {reason}")]
    DeliveryFailed { reason: String },

    /// Persisted state exists but cannot be decoded. Surfaced so the
    /// operator sees it instead of losing dedup history and price
    /// baselines to a silent reset.
    #[error("store corrupt at {path}: {reason}")]
    StoreCorrupt { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
