//! Upstream ticker payload decoding.
//!
//! Endpoints disagree on shape: some nest the ticker object under a
//! `ticker` key, others return it flat at the top level. Numeric fields
//! arrive as JSON numbers or as strings depending on the endpoint, so both
//! encodings are accepted.

use serde_json::Value;
use tickerbot_core::TickerSnapshot;

/// Decode a response body into a snapshot.
///
/// Returns `None` unless the payload carries a finite, positive `last`
/// price — an unusable ticker must never reach the cache.
pub fn decode_snapshot(body: &Value, volume_key: &str) -> Option<TickerSnapshot> {
    let ticker = match body.get("ticker") {
        Some(nested) if nested.is_object() => nested,
        _ => body,
    };
    if !ticker.is_object() {
        return None;
    }

    let last = numeric(ticker.get("last")?)?;
    if !(last.is_finite() && last > 0.0) {
        return None;
    }

    let volume = ticker
        .get(volume_key)
        .or_else(|| ticker.get("volume"))
        .and_then(numeric);

    Some(TickerSnapshot {
        last,
        high: ticker.get("high").and_then(numeric),
        low: ticker.get("low").and_then(numeric),
        buy: ticker.get("buy").and_then(numeric),
        sell: ticker.get("sell").and_then(numeric),
        volume,
    })
}

/// Accept a JSON number or a string-encoded number.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
