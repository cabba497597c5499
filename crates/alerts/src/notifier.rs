//! Alert delivery.

use crate::registry::{AlertSubscription, SubscriberId};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use thiserror::Error;
use tickerbot_core::TickerSnapshot;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to deliver notification: {0}")]
    Send(String),
}

/// Sink for triggered alert notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subscriber: SubscriberId, text: &str) -> Result<(), NotifyError>;
}

/// Sends notifications through the Telegram bot API.
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, subscriber: SubscriberId, text: &str) -> Result<(), NotifyError> {
        self.bot
            .send_message(ChatId(subscriber.0), text)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|err| NotifyError::Send(err.to_string()))?;
        Ok(())
    }
}

/// Format a triggered alert as a Telegram message.
pub fn format_trigger_message(
    subscription: &AlertSubscription,
    snapshot: &TickerSnapshot,
) -> String {
    let mut msg = format!(
        "🚨 <b>Price alert!</b>\n\n\
         <b>{}</b> reached your target.\n\
         Target: {}\n\
         Last: {}",
        subscription.pair.as_str().to_uppercase(),
        subscription.target_price,
        snapshot.last,
    );

    let now = chrono::Utc::now();
    msg.push_str(&format!("\n\n⏰ {}", now.format("%Y-%m-%d %H:%M:%S UTC")));

    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickerbot_core::Pair;

    #[test]
    fn test_trigger_message_contents() {
        let subscription = AlertSubscription {
            subscriber: SubscriberId(42),
            pair: Pair::new("btcidr"),
            target_price: 1_000_000.0,
        };
        let snapshot = TickerSnapshot::with_last(1_000_050.0);

        let msg = format_trigger_message(&subscription, &snapshot);
        assert!(msg.contains("BTCIDR"));
        assert!(msg.contains("1000000"));
        assert!(msg.contains("1000050"));
        assert!(msg.contains("UTC"));
    }
}
