//! Durable state for the seen-set and per-asset price records
//!
//! Two independent backing files:
//! - the seen file, one article id per line, sorted;
//! - the price state file, a JSON object keyed by asset id.
//!
//! Missing files on first run load as empty state. Files that exist but
//! cannot be decoded are reported as [`RunError::StoreCorrupt`] rather
//! than being silently replaced with empty state, which would erase the
//! dedup history and every price baseline. Saves go through a temp file
//! followed by a rename so a crash mid-write never truncates previously
//! committed state.

use crate::dedup::SeenSet;
use crate::detector::PriceRecord;
use crate::error::RunError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The logical state held by the store: seen ids plus price records.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub seen: SeenSet,
    pub prices: HashMap<String, PriceRecord>,
}

/// File-backed store.
pub struct FileStore {
    seen_path: PathBuf,
    prices_path: PathBuf,
}

impl FileStore {
    pub fn new(seen_path: impl Into<PathBuf>, prices_path: impl Into<PathBuf>) -> Self {
        Self {
            seen_path: seen_path.into(),
            prices_path: prices_path.into(),
        }
    }

    /// Load both backing files. Absent files yield empty structures.
    pub fn load(&self) -> Result<StoreState, RunError> {
        let seen = self.load_seen()?;
        let prices = self.load_prices()?;
        log::info!(
            "loaded store: {} seen ids, {} price records",
            seen.len(),
            prices.len()
        );
        Ok(StoreState { seen, prices })
    }

    /// Persist both backing files atomically (write-new-then-rename).
    pub fn save(&self, state: &StoreState) -> Result<(), RunError> {
        let mut lines = String::new();
        for id in state.seen.iter() {
            lines.push_str(id);
            lines.push('\n');
        }
        write_atomic(&self.seen_path, lines.as_bytes())?;

        let json = serde_json::to_string_pretty(&state.prices)?;
        write_atomic(&self.prices_path, json.as_bytes())?;

        log::debug!(
            "saved store: {} seen ids, {} price records",
            state.seen.len(),
            state.prices.len()
        );
        Ok(())
    }

    fn load_seen(&self) -> Result<SeenSet, RunError> {
        if !self.seen_path.exists() {
            log::info!("no seen file at {}, starting empty", self.seen_path.display());
            return Ok(SeenSet::new());
        }

        let content = fs::read_to_string(&self.seen_path)?;
        Ok(content
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect())
    }

    fn load_prices(&self) -> Result<HashMap<String, PriceRecord>, RunError> {
        if !self.prices_path.exists() {
            log::info!(
                "no price state file at {}, starting empty",
                self.prices_path.display()
            );
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.prices_path)?;
        serde_json::from_str(&content).map_err(|e| RunError::StoreCorrupt {
            path: self.prices_path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Write `bytes` to a sibling temp file, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RunError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
