//! Notification delivery
//!
//! The [`Notifier`] trait is the seam the runner talks through; the
//! production implementation posts HTML messages to the Telegram Bot API.
//! Delivery is attempt-only: a failed call is reported to the caller and
//! never retried here. The fixed pacing delay after each send is this
//! collaborator's rate-limit policy, not the runner's.

use crate::dedup::NewsItem;
use crate::detector::{AlertEvent, AlertKind};
use crate::error::RunError;
use async_trait::async_trait;
use chrono::Duration;
use serde::Serialize;

/// Sink for outgoing notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one pre-formatted HTML payload.
    async fn send_text(&self, text: &str) -> Result<(), RunError>;
}

/// Request body for the Bot API `sendMessage` call.
#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    token: String,
    chat_id: String,
    send_delay: std::time::Duration,
}

impl TelegramNotifier {
    pub fn new(
        token: String,
        chat_id: String,
        send_delay: std::time::Duration,
    ) -> Result<Self, RunError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()?;

        Ok(Self {
            client,
            token,
            chat_id,
            send_delay,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, text: &str) -> Result<(), RunError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let payload = SendMessagePayload {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RunError::DeliveryFailed {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RunError::DeliveryFailed {
                reason: format!("sendMessage returned {}", response.status()),
            });
        }

        // Pace consecutive sends to stay under the Bot API rate limit.
        tokio::time::sleep(self.send_delay).await;
        Ok(())
    }
}

/// Render a news item as an HTML message. Items without a summary get a
/// degraded payload: title and link only.
pub fn format_news(item: &NewsItem) -> String {
    match &item.summary {
        Some(summary) => format!(
            "🔹 <b>{}</b>\n\n{}\n\n🔗 <a href=\"{}\">Read more</a>",
            escape_html(&item.title),
            escape_html(summary),
            item.link
        ),
        None => format!(
            "🔹 <b>{}</b>\n\n🔗 <a href=\"{}\">Read more</a>",
            escape_html(&item.title),
            item.link
        ),
    }
}

/// Render a price alert as an HTML message.
pub fn format_alert(event: &AlertEvent) -> String {
    let arrow = if event.pct_change >= 0.0 { "📈" } else { "📉" };
    let window = match event.kind {
        AlertKind::ShortWindow => "spike",
        AlertKind::LongWindow => "move",
    };
    format!(
        "{} <b>{}</b> {:+.2}% {} in {}\n${:.2} → ${:.2}",
        arrow,
        escape_html(&event.asset_id),
        event.pct_change,
        window,
        format_elapsed(event.elapsed),
        event.old_price,
        event.new_price
    )
}

/// Minimal escaping for the HTML parse mode.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn format_elapsed(elapsed: Duration) -> String {
    let minutes = elapsed.num_minutes();
    if minutes < 60 {
        format!("{}m", minutes.max(1))
    } else if minutes < 48 * 60 {
        format!("{}h", minutes / 60)
    } else {
        format!("{}d", minutes / (24 * 60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(kind: AlertKind, pct: f64, elapsed: Duration) -> AlertEvent {
        AlertEvent {
            asset_id: "bitcoin".to_string(),
            kind,
            old_price: 100.0,
            new_price: 100.0 * (1.0 + pct / 100.0),
            pct_change: pct,
            elapsed,
        }
    }

    #[test]
    fn test_format_news_with_summary() {
        let item = NewsItem {
            link: "https://example.com/a".to_string(),
            title: "Bitcoin & friends".to_string(),
            summary: Some("Something <happened>.".to_string()),
        };

        let text = format_news(&item);
        assert!(text.contains("<b>Bitcoin &amp; friends</b>"));
        assert!(text.contains("Something &lt;happened&gt;."));
        assert!(text.contains("href=\"https://example.com/a\""));
    }

    #[test]
    fn test_format_news_degraded_without_summary() {
        let item = NewsItem {
            link: "https://example.com/a".to_string(),
            title: "Headline".to_string(),
            summary: None,
        };

        let text = format_news(&item);
        assert!(text.contains("<b>Headline</b>"));
        assert!(text.contains("Read more"));
        assert_eq!(text.matches("\n\n").count(), 1);
    }

    #[test]
    fn test_format_alert_rising() {
        let event = make_event(AlertKind::ShortWindow, 6.0, Duration::minutes(1));
        let text = format_alert(&event);
        assert!(text.starts_with("📈"));
        assert!(text.contains("+6.00%"));
        assert!(text.contains("spike in 1m"));
        assert!(text.contains("$100.00 → $106.00"));
    }

    #[test]
    fn test_format_alert_falling_long_window() {
        let event = make_event(AlertKind::LongWindow, -11.0, Duration::hours(25));
        let text = format_alert(&event);
        assert!(text.starts_with("📉"));
        assert!(text.contains("-11.00%"));
        assert!(text.contains("move in 25h"));
    }

    #[test]
    fn test_format_elapsed_units() {
        assert_eq!(format_elapsed(Duration::seconds(20)), "1m");
        assert_eq!(format_elapsed(Duration::minutes(59)), "59m");
        assert_eq!(format_elapsed(Duration::hours(30)), "30h");
        assert_eq!(format_elapsed(Duration::days(3)), "3d");
    }
}
