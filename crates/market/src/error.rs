//! Error types for ticker fetching.

use thiserror::Error;
use tickerbot_core::Pair;

/// Terminal outcomes of a ticker fetch. Per-endpoint trouble never shows
/// up here; it is logged and absorbed by the fallback walk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("unknown trading pair: {0}")]
    UnknownPair(Pair),

    #[error("all ticker endpoints failed for {0}")]
    AllEndpointsFailed(Pair),
}

/// What went wrong at a single upstream endpoint.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected status: HTTP {0}")]
    Status(u16),

    #[error("invalid response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for EndpointError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EndpointError::Timeout
        } else if err.is_decode() {
            EndpointError::Body(err.to_string())
        } else {
            EndpointError::Request(err.to_string())
        }
    }
}
