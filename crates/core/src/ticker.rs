//! Point-in-time market data for a single trading pair.

use serde::{Deserialize, Serialize};

/// Last known market state for one pair, as reported by the upstream
/// ticker API. Only `last` is guaranteed; the remaining fields are
/// whatever the endpoint chose to include.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    /// Last trade price. Always finite and positive: decoders must refuse
    /// to build a snapshot otherwise, so downstream code never re-checks.
    pub last: f64,
    /// 24h high.
    pub high: Option<f64>,
    /// 24h low.
    pub low: Option<f64>,
    /// Best bid.
    pub buy: Option<f64>,
    /// Best ask.
    pub sell: Option<f64>,
    /// 24h traded volume in the base asset.
    pub volume: Option<f64>,
}

impl TickerSnapshot {
    /// Snapshot carrying only a last price.
    pub fn with_last(last: f64) -> Self {
        Self {
            last,
            high: None,
            low: None,
            buy: None,
            sell: None,
            volume: None,
        }
    }

    /// The invariant every stored or returned snapshot satisfies.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.last.is_finite() && self.last > 0.0
    }
}
