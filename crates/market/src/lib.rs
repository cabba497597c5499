//! Ticker data fetching for the bot.
//!
//! Resolution order for a pair: allow-list gate, TTL cache, then the
//! configured endpoints walked in priority order until one returns a
//! usable snapshot.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod payload;
pub mod transport;

pub use cache::TickerCache;
pub use config::MarketConfig;
pub use error::{EndpointError, FetchError};
pub use fetcher::{EndpointHealth, FetchStatsSummary, TickerFetcher};
pub use transport::{HttpTransport, Transport};
