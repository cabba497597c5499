//! Telegram command surface.

use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, ParseMode};
use teloxide::utils::command::BotCommands;
use thiserror::Error;
use tickerbot_alerts::{AlertError, AlertRegistry, SubscriberId};
use tickerbot_core::{Pair, TickerSnapshot};
use tickerbot_market::{EndpointHealth, FetchError, FetchStatsSummary, TickerFetcher};

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Telegram API error: {0}")]
    Api(#[from] teloxide::RequestError),
}

/// Bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and show the menu")]
    Start,
    #[command(description = "Current price. Usage: /price btcidr")]
    Price(String),
    #[command(description = "Summary of the most traded pairs")]
    Top,
    #[command(description = "24h market details. Usage: /market btcidr")]
    Market(String),
    #[command(description = "Arm a price alert. Usage: /alert btcidr 1000000000")]
    Alert(String),
    #[command(description = "Disarm your price alert")]
    Unalert,
    #[command(description = "Check upstream endpoint health")]
    Status,
    #[command(description = "Show help")]
    Help,
}

/// Telegram bot wrapper: owns the fetch and alert handles and turns
/// commands into replies.
pub struct TickerBot {
    bot: Bot,
    fetcher: Arc<TickerFetcher>,
    registry: Arc<AlertRegistry>,
    top_pairs: Vec<Pair>,
    quote: String,
}

impl TickerBot {
    pub fn new(
        bot: Bot,
        fetcher: Arc<TickerFetcher>,
        registry: Arc<AlertRegistry>,
        top_pairs: Vec<Pair>,
        quote: String,
    ) -> Self {
        Self {
            bot,
            fetcher,
            registry,
            top_pairs,
            quote,
        }
    }

    /// Run the command dispatcher until shutdown.
    pub async fn run(self: Arc<Self>) {
        let bot = self.bot.clone();
        let handler = Update::filter_message().filter_command::<Command>().endpoint(
            move |bot: Bot, msg: Message, cmd: Command| {
                let this = Arc::clone(&self);
                async move { this.handle_command(bot, msg, cmd).await }
            },
        );

        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    async fn handle_command(
        &self,
        bot: Bot,
        msg: Message,
        cmd: Command,
    ) -> Result<(), TelegramError> {
        let chat_id = msg.chat.id;

        match cmd {
            Command::Start => {
                let text = "👋 Welcome to <b>Ticker Bot</b>!\n\n\
                            Ask for prices, market details and one-shot price alerts \
                            using the menu below.";
                bot.send_message(chat_id, text)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(menu_keyboard())
                    .await?;
            }

            Command::Help => {
                bot.send_message(chat_id, Command::descriptions().to_string())
                    .reply_markup(menu_keyboard())
                    .await?;
            }

            Command::Price(args) => {
                let args = args.trim();
                if args.is_empty() {
                    bot.send_message(chat_id, "Usage: /price <pair>\nExample: /price btcidr")
                        .reply_markup(menu_keyboard())
                        .await?;
                    return Ok(());
                }
                let pair = Pair::new(args);
                let text = match self.fetcher.fetch(&pair).await {
                    Ok(snapshot) => format_price_reply(&pair, &snapshot),
                    Err(err) => fetch_failure_reply(&err),
                };
                bot.send_message(chat_id, text)
                    .parse_mode(ParseMode::Html)
                    .await?;
            }

            Command::Top => {
                let results = self.fetcher.fetch_many(&self.top_pairs).await;
                bot.send_message(chat_id, format_top_reply(&results))
                    .parse_mode(ParseMode::Html)
                    .await?;
            }

            Command::Market(args) => {
                let args = args.trim();
                if args.is_empty() {
                    bot.send_message(chat_id, "Usage: /market <pair>\nExample: /market btcidr")
                        .reply_markup(menu_keyboard())
                        .await?;
                    return Ok(());
                }
                let pair = Pair::new(args);
                let text = match self.fetcher.fetch(&pair).await {
                    Ok(snapshot) => format_market_reply(&pair, &snapshot, &self.quote),
                    Err(err) => fetch_failure_reply(&err),
                };
                bot.send_message(chat_id, text)
                    .parse_mode(ParseMode::Html)
                    .await?;
            }

            Command::Alert(args) => {
                let mut parts = args.split_whitespace();
                let (Some(symbol), Some(target)) = (parts.next(), parts.next()) else {
                    bot.send_message(
                        chat_id,
                        "Usage: /alert <pair> <price>\nExample: /alert btcidr 1000000000",
                    )
                    .reply_markup(menu_keyboard())
                    .await?;
                    return Ok(());
                };
                let Ok(target) = target.parse::<f64>() else {
                    bot.send_message(chat_id, "❌ The target price must be a number.")
                        .reply_markup(menu_keyboard())
                        .await?;
                    return Ok(());
                };

                let pair = Pair::new(symbol);
                let text = match self.registry.set(SubscriberId(chat_id.0), pair.clone(), target)
                {
                    Ok(Some(previous)) => format!(
                        "🔔 Alert set for {} at {} (replaced your alert for {}).",
                        pair.as_str().to_uppercase(),
                        format_price(target),
                        previous.pair.as_str().to_uppercase(),
                    ),
                    Ok(None) => format!(
                        "🔔 Alert set for {} at {}.",
                        pair.as_str().to_uppercase(),
                        format_price(target),
                    ),
                    Err(AlertError::UnknownPair(pair)) => {
                        format!("⚠️ {} is not a supported pair.", pair.as_str().to_uppercase())
                    }
                    Err(AlertError::InvalidTarget(_)) => {
                        "❌ The target price must be a positive number.".to_string()
                    }
                };
                bot.send_message(chat_id, text)
                    .reply_markup(menu_keyboard())
                    .await?;
            }

            Command::Unalert => {
                let text = match self.registry.remove(SubscriberId(chat_id.0)) {
                    Some(previous) => format!(
                        "🔕 Alert for {} removed.",
                        previous.pair.as_str().to_uppercase()
                    ),
                    None => "You have no active alert.".to_string(),
                };
                bot.send_message(chat_id, text)
                    .reply_markup(menu_keyboard())
                    .await?;
            }

            Command::Status => {
                bot.send_message(chat_id, "⏳ Checking endpoints...").await?;
                let report = self.fetcher.probe_endpoints().await;
                let stats = self.fetcher.stats();
                bot.send_message(chat_id, format_status_reply(&report, stats))
                    .parse_mode(ParseMode::Html)
                    .await?;
            }
        }

        Ok(())
    }
}

/// Persistent reply-keyboard menu shown with most replies.
fn menu_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![
            KeyboardButton::new("/price btcidr"),
            KeyboardButton::new("/top"),
        ],
        vec![
            KeyboardButton::new("/market btcidr"),
            KeyboardButton::new("/status"),
        ],
        vec![KeyboardButton::new("/help")],
    ];
    KeyboardMarkup::new(keyboard)
        .resize_keyboard()
        .input_field_placeholder("Pick a command...")
}

/// Format a price with appropriate precision based on magnitude.
fn format_price(price: f64) -> String {
    if price.abs() >= 1000.0 {
        group_thousands(price)
    } else if price.abs() >= 1.0 {
        format!("{:.2}", price)
    } else {
        format!("{:.6}", price)
    }
}

fn group_thousands(price: f64) -> String {
    let negative = price < 0.0;
    let digits = format!("{:.0}", price.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn opt_price(value: Option<f64>) -> String {
    value.map(format_price).unwrap_or_else(|| "n/a".to_string())
}

fn fetch_failure_reply(err: &FetchError) -> String {
    match err {
        FetchError::UnknownPair(pair) => {
            format!("⚠️ {} is not a supported pair.", pair.as_str().to_uppercase())
        }
        FetchError::AllEndpointsFailed(_) => {
            "❌ Ticker data is unavailable right now. Try again later or check /status."
                .to_string()
        }
    }
}

fn format_price_reply(pair: &Pair, snapshot: &TickerSnapshot) -> String {
    format!(
        "📊 <b>{} price</b>\n\n\
         💰 Last: {}\n\
         📈 24h high: {}\n\
         📉 24h low: {}",
        pair.as_str().to_uppercase(),
        format_price(snapshot.last),
        opt_price(snapshot.high),
        opt_price(snapshot.low),
    )
}

fn format_market_reply(pair: &Pair, snapshot: &TickerSnapshot, quote: &str) -> String {
    let base = pair.base(quote).to_uppercase();
    format!(
        "📊 <b>{} market</b>\n\n\
         💰 Last: {}\n\
         📈 24h high: {}\n\
         📉 24h low: {}\n\
         🟢 Buy: {}\n\
         🔴 Sell: {}\n\
         📦 Volume: {} {}",
        pair.as_str().to_uppercase(),
        format_price(snapshot.last),
        opt_price(snapshot.high),
        opt_price(snapshot.low),
        opt_price(snapshot.buy),
        opt_price(snapshot.sell),
        snapshot
            .volume
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "n/a".to_string()),
        base,
    )
}

fn format_top_reply(results: &[(Pair, Result<TickerSnapshot, FetchError>)]) -> String {
    let mut available = 0;
    let mut msg = String::from("🔥 <b>Top pairs</b>\n\n");
    for (pair, result) in results {
        let line = match result {
            Ok(snapshot) => {
                available += 1;
                format!(
                    "▫️ {}: {}\n",
                    pair.as_str().to_uppercase(),
                    format_price(snapshot.last)
                )
            }
            Err(_) => format!("▫️ {}: unavailable\n", pair.as_str().to_uppercase()),
        };
        msg.push_str(&line);
    }

    if available == 0 {
        return "❌ Could not fetch any pair right now. Check /status.".to_string();
    }
    msg
}

fn format_status_reply(report: &[EndpointHealth], stats: FetchStatsSummary) -> String {
    let mut msg = String::from("🔍 <b>Endpoint status</b>\n\n");
    for (i, health) in report.iter().enumerate() {
        let mark = if health.healthy { "✅" } else { "❌" };
        msg.push_str(&format!("{} Endpoint {}: {}\n", mark, i + 1, health.endpoint));
    }

    let working = report.iter().filter(|h| h.healthy).count();
    msg.push_str(&format!(
        "\n📊 Working endpoints: {}/{}\n",
        working,
        report.len()
    ));
    msg.push_str(if working > 0 {
        "✅ Ticker data is available."
    } else {
        "❌ All endpoints are down; ticker data is unavailable."
    });

    msg.push_str(&format!(
        "\n\nCache hits: {} · Upstream requests: {}",
        stats.cache_hits, stats.upstream_requests,
    ));
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snapshot() -> TickerSnapshot {
        TickerSnapshot {
            last: 1_000_050_000.0,
            high: Some(1_010_000_000.0),
            low: Some(995_000_000.0),
            buy: Some(1_000_000_000.0),
            sell: Some(1_000_100_000.0),
            volume: Some(12.5),
        }
    }

    #[test]
    fn test_command_parsing() {
        let cmd = Command::parse("/price btcidr", "tickerbot").unwrap();
        assert!(matches!(cmd, Command::Price(args) if args == "btcidr"));

        let cmd = Command::parse("/alert btcidr 1000000", "tickerbot").unwrap();
        assert!(matches!(cmd, Command::Alert(args) if args == "btcidr 1000000"));

        let cmd = Command::parse("/unalert", "tickerbot").unwrap();
        assert!(matches!(cmd, Command::Unalert));
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1_000_050_000.0), "1,000,050,000");
        assert_eq!(format_price(1234.0), "1,234");
        assert_eq!(format_price(42.5), "42.50");
        assert_eq!(format_price(0.00123), "0.001230");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(1.0), "1");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(123_456_789.0), "123,456,789");
        assert_eq!(group_thousands(-1234.0), "-1,234");
    }

    #[test]
    fn test_price_reply() {
        let reply = format_price_reply(&Pair::new("btcidr"), &snapshot());
        assert!(reply.contains("BTCIDR"));
        assert!(reply.contains("1,000,050,000"));
        assert!(reply.contains("1,010,000,000"));
    }

    #[test]
    fn test_market_reply_includes_volume_in_base() {
        let reply = format_market_reply(&Pair::new("btcidr"), &snapshot(), "idr");
        assert!(reply.contains("12.50 BTC"));
        assert!(reply.contains("Buy: 1,000,000,000"));
    }

    #[test]
    fn test_market_reply_without_volume() {
        let bare = TickerSnapshot::with_last(500.0);
        let reply = format_market_reply(&Pair::new("ethidr"), &bare, "idr");
        assert!(reply.contains("n/a ETH"));
    }

    #[test]
    fn test_top_reply_mixes_hits_and_misses() {
        let results = vec![
            (
                Pair::new("btcidr"),
                Ok(TickerSnapshot::with_last(1_000_000.0)),
            ),
            (
                Pair::new("ethidr"),
                Err(FetchError::AllEndpointsFailed(Pair::new("ethidr"))),
            ),
        ];
        let reply = format_top_reply(&results);
        assert!(reply.contains("BTCIDR: 1,000,000"));
        assert!(reply.contains("ETHIDR: unavailable"));
    }

    #[test]
    fn test_top_reply_all_failed() {
        let results = vec![(
            Pair::new("btcidr"),
            Err(FetchError::AllEndpointsFailed(Pair::new("btcidr"))),
        )];
        let reply = format_top_reply(&results);
        assert!(reply.contains("Could not fetch any pair"));
    }

    #[test]
    fn test_status_reply() {
        let report = vec![
            EndpointHealth {
                endpoint: "https://one".to_string(),
                healthy: true,
            },
            EndpointHealth {
                endpoint: "https://two".to_string(),
                healthy: false,
            },
        ];
        let stats = FetchStatsSummary {
            cache_hits: 3,
            upstream_requests: 7,
            upstream_failures: 2,
        };
        let reply = format_status_reply(&report, stats);
        assert!(reply.contains("✅ Endpoint 1: https://one"));
        assert!(reply.contains("❌ Endpoint 2: https://two"));
        assert!(reply.contains("Working endpoints: 1/2"));
        assert!(reply.contains("Cache hits: 3"));
    }

    #[test]
    fn test_fetch_failure_replies() {
        let reply = fetch_failure_reply(&FetchError::UnknownPair(Pair::new("xyzusd")));
        assert!(reply.contains("XYZUSD is not a supported pair"));

        let reply = fetch_failure_reply(&FetchError::AllEndpointsFailed(Pair::new("btcidr")));
        assert!(reply.contains("unavailable"));
    }
}
