//! Market data configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the ticker fetch layer: which pairs are served, which
/// endpoints are tried in which order, and the cache/timeout constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Allow-listed pair symbols.
    pub pairs: Vec<String>,
    /// Quote asset suffix shared by the pairs (used for volume field lookup).
    pub quote: String,
    /// Ticker endpoint base URLs, in fallback priority order.
    pub endpoints: Vec<String>,
    /// Hard per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Cache entry time-to-live in seconds.
    pub cache_ttl_secs: u64,
    /// Maximum number of cached pairs.
    pub cache_capacity: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            pairs: [
                "btcidr", "ethidr", "ltcidr", "xrpidr", "adaidr", "dogidr", "shibidr",
                "maticidr",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            quote: "idr".to_string(),
            endpoints: vec![
                "https://indodax.com/api/ticker".to_string(),
                "https://indodax.com/tapi/ticker".to_string(),
                "https://api.indodax.com/ticker".to_string(),
            ],
            request_timeout_secs: 15,
            cache_ttl_secs: 60,
            cache_capacity: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = MarketConfig::default();
        assert_eq!(config.endpoints.len(), 3);
        assert_eq!(config.quote, "idr");
        assert!(config.pairs.contains(&"btcidr".to_string()));
        assert_eq!(config.cache_capacity, 100);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: MarketConfig =
            serde_json::from_str(r#"{"cache_ttl_secs": 90}"#).unwrap();
        assert_eq!(config.cache_ttl_secs, 90);
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.endpoints.len(), 3);
    }

    #[test]
    fn test_config_round_trip() {
        let config = MarketConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: MarketConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.pairs, config.pairs);
        assert_eq!(parsed.endpoints, config.endpoints);
    }
}
