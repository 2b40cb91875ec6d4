//! Production entry point: run one aggregation pass and exit.
//!
//! Scheduling is external (cron, CI timer). Two overlapping invocations
//! against the same state files are not supported; the store save is
//! last-writer-wins.

use coinflow::{
    run_pass, CoinGeckoSource, Config, FileStore, RssNewsSource, RunError, TelegramNotifier,
};

#[tokio::main]
async fn main() -> Result<(), RunError> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    // Respect RUST_LOG when set, default to info otherwise.
    let mut builder = if config.rust_log.is_some() {
        env_logger::Builder::from_default_env()
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    };
    builder.target(env_logger::Target::Stderr).init();

    log::info!("🚀 starting coinflow pass");
    log::info!("   feeds: {}", config.rss_feeds.len());
    log::info!("   tracked assets: {:?}", config.tracked_assets);

    let store = FileStore::new(&config.seen_path, &config.price_state_path);
    let news = RssNewsSource::new(config.rss_feeds.clone(), config.news_keywords.clone())?;
    let prices = CoinGeckoSource::new()?;
    let notifier = TelegramNotifier::new(
        config.bot_token.clone(),
        config.channel_id.clone(),
        config.send_delay(),
    )?;

    let summary = run_pass(&config, &store, &news, &prices, &notifier).await?;

    log::info!(
        "✅ pass complete: {} news sent ({} already seen, {} failed), {} alerts sent from {} observations",
        summary.news_sent,
        summary.news_already_seen,
        summary.news_failed,
        summary.alerts_sent,
        summary.observations
    );

    Ok(())
}
