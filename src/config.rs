//! Configuration loaded from environment variables

use crate::detector::DetectorConfig;
use crate::error::RunError;
use chrono::Duration;
use std::env;

/// Runtime configuration, built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub channel_id: String,

    pub rss_feeds: Vec<String>,
    pub news_keywords: Vec<String>,
    pub tracked_assets: Vec<String>,

    pub seen_path: String,
    pub price_state_path: String,

    pub short_window_minutes: i64,
    pub short_threshold_pct: f64,
    pub long_window_minutes: i64,
    pub long_threshold_pct: f64,

    pub send_delay_ms: u64,
    pub rust_log: Option<String>,
}

const DEFAULT_FEEDS: &[&str] = &["https://cointelegraph.com/rss"];

const DEFAULT_KEYWORDS: &[&str] = &[
    "Bitcoin", "BTC", "Ethereum", "ETH", "XRP", "SOL", "DOGE", "ADA", "ETF", "SEC",
];

const DEFAULT_ASSETS: &[&str] = &["bitcoin", "ethereum"];

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `BOT_TOKEN` and `CHANNEL_ID` are required; everything else has a
    /// default. List-valued variables are comma-separated.
    pub fn from_env() -> Result<Self, RunError> {
        let bot_token = require_var("BOT_TOKEN")?;
        let channel_id = require_var("CHANNEL_ID")?;

        Ok(Self {
            bot_token,
            channel_id,

            rss_feeds: list_var("RSS_FEEDS").unwrap_or_else(|| to_strings(DEFAULT_FEEDS)),
            news_keywords: list_var("NEWS_KEYWORDS")
                .unwrap_or_else(|| to_strings(DEFAULT_KEYWORDS)),
            tracked_assets: list_var("TRACKED_ASSETS")
                .unwrap_or_else(|| to_strings(DEFAULT_ASSETS)),

            seen_path: env::var("SEEN_FILE").unwrap_or_else(|_| "seen.txt".to_string()),
            price_state_path: env::var("PRICE_STATE_FILE")
                .unwrap_or_else(|_| "price_state.json".to_string()),

            short_window_minutes: parse_var("SHORT_WINDOW_MINUTES", 4 * 60),
            short_threshold_pct: parse_var("SHORT_THRESHOLD_PCT", 5.0),
            long_window_minutes: parse_var("LONG_WINDOW_MINUTES", 24 * 60),
            long_threshold_pct: parse_var("LONG_THRESHOLD_PCT", 10.0),

            send_delay_ms: parse_var("SEND_DELAY_MS", 1_000),
            rust_log: env::var("RUST_LOG").ok(),
        })
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            short_window: Duration::minutes(self.short_window_minutes),
            short_threshold_pct: self.short_threshold_pct,
            long_window: Duration::minutes(self.long_window_minutes),
            long_threshold_pct: self.long_threshold_pct,
        }
    }

    pub fn send_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.send_delay_ms)
    }
}

fn require_var(name: &'static str) -> Result<String, RunError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(RunError::ConfigMissing { name }),
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn list_var(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|s| split_list(&s))
}

/// Comma-separated list with trimming; empty entries are dropped.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn to_strings(defaults: &[&str]) -> Vec<String> {
    defaults.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env vars are process-wide; serialize the tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_optional_vars() {
        for name in [
            "RSS_FEEDS",
            "NEWS_KEYWORDS",
            "TRACKED_ASSETS",
            "SEEN_FILE",
            "PRICE_STATE_FILE",
            "SHORT_WINDOW_MINUTES",
            "SHORT_THRESHOLD_PCT",
            "LONG_WINDOW_MINUTES",
            "LONG_THRESHOLD_PCT",
            "SEND_DELAY_MS",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list("a,,b,"), vec!["a", "b"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_defaults_with_credentials_set() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_optional_vars();
        env::set_var("BOT_TOKEN", "token-123");
        env::set_var("CHANNEL_ID", "@channel");

        let config = Config::from_env().unwrap();

        assert_eq!(config.bot_token, "token-123");
        assert_eq!(config.channel_id, "@channel");
        assert_eq!(config.rss_feeds, vec!["https://cointelegraph.com/rss"]);
        assert_eq!(config.tracked_assets, vec!["bitcoin", "ethereum"]);
        assert_eq!(config.seen_path, "seen.txt");
        assert_eq!(config.short_window_minutes, 240);
        assert_eq!(config.short_threshold_pct, 5.0);
        assert_eq!(config.long_window_minutes, 1440);
        assert_eq!(config.long_threshold_pct, 10.0);
        assert_eq!(config.send_delay_ms, 1_000);

        env::remove_var("BOT_TOKEN");
        env::remove_var("CHANNEL_ID");
    }

    #[test]
    fn test_missing_credentials_halt() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var("BOT_TOKEN");
        env::remove_var("CHANNEL_ID");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, RunError::ConfigMissing { name: "BOT_TOKEN" }));
    }

    #[test]
    fn test_custom_lists_and_thresholds() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_optional_vars();
        env::set_var("BOT_TOKEN", "token-123");
        env::set_var("CHANNEL_ID", "@channel");
        env::set_var("TRACKED_ASSETS", "solana, dogecoin");
        env::set_var("SHORT_WINDOW_MINUTES", "60");
        env::set_var("SHORT_THRESHOLD_PCT", "2.5");

        let config = Config::from_env().unwrap();
        assert_eq!(config.tracked_assets, vec!["solana", "dogecoin"]);
        assert_eq!(config.short_window_minutes, 60);
        assert_eq!(config.short_threshold_pct, 2.5);

        let detector = config.detector_config();
        assert_eq!(detector.short_window, Duration::minutes(60));
        assert_eq!(detector.long_window, Duration::minutes(1440));

        clear_optional_vars();
        env::remove_var("BOT_TOKEN");
        env::remove_var("CHANNEL_ID");
    }
}
