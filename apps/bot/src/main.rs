//! Ticker Bot - Telegram front-end for exchange ticker data.
//!
//! Answers price queries for an allow-listed set of trading pairs and
//! delivers one-shot price alerts, backed by a public ticker API with
//! endpoint fallback.

mod config;
mod keep_alive;
mod telegram;

use clap::Parser;
use config::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use teloxide::Bot;
use telegram::TickerBot;
use tickerbot_alerts::{AlertEvaluator, AlertRegistry, TelegramNotifier};
use tickerbot_core::Pair;
use tickerbot_market::{HttpTransport, TickerFetcher};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Ticker Bot CLI
#[derive(Parser, Debug)]
#[command(name = "tickerbot")]
#[command(about = "Telegram crypto ticker and price-alert bot", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_logging(&args.log_level);

    info!("🚀 Ticker bot starting...");
    let config = AppConfig::load(&args.config);
    info!("  Pairs: {}", config.market.pairs.len());
    info!("  Endpoints: {}", config.market.endpoints.len());
    info!("  Cache TTL: {}s", config.market.cache_ttl_secs);
    info!("  Alert interval: {}s", config.evaluator.interval_secs);

    // The bot token is the one piece of configuration without which
    // nothing works: refuse to start without it.
    let token = match std::env::var("BOT_TOKEN") {
        Ok(token) if !token.is_empty() => token,
        _ => {
            error!("BOT_TOKEN is not set; set it in the environment or a .env file");
            std::process::exit(1);
        }
    };

    let timeout = Duration::from_secs(config.market.request_timeout_secs);
    let transport = match HttpTransport::new(timeout) {
        Ok(transport) => Arc::new(transport),
        Err(err) => {
            error!("failed to build HTTP client: {err}");
            std::process::exit(1);
        }
    };

    let fetcher = Arc::new(TickerFetcher::new(&config.market, transport));
    let registry = Arc::new(AlertRegistry::new(fetcher.pairs().clone()));

    let bot = Bot::new(token);

    // Alert evaluation runs on its own timer, independent of user traffic.
    let notifier = Arc::new(TelegramNotifier::new(bot.clone()));
    let evaluator = AlertEvaluator::new(
        registry.clone(),
        fetcher.clone(),
        notifier,
        &config.evaluator,
    );
    tokio::spawn(evaluator.run());

    if config.keep_alive.enabled {
        let port = config.keep_alive.port;
        tokio::spawn(async move {
            if let Err(err) = keep_alive::serve(port).await {
                warn!("keep-alive server error: {err}");
            }
        });
    }

    let top_pairs: Vec<Pair> = config.top_pairs.iter().map(|s| Pair::new(s)).collect();
    let handler = Arc::new(TickerBot::new(
        bot,
        fetcher,
        registry,
        top_pairs,
        config.market.quote.clone(),
    ));

    info!("Bot is running; press Ctrl+C to stop");
    handler.run().await;

    info!("👋 Ticker bot stopped");
}
