//! Ticker resolution with cache-first lookup and endpoint fallback.

use crate::cache::TickerCache;
use crate::config::MarketConfig;
use crate::error::FetchError;
use crate::payload::decode_snapshot;
use crate::transport::Transport;
use futures_util::future::join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tickerbot_core::{Pair, PairList, TickerSnapshot};
use tracing::{debug, warn};

/// Fetch-layer counters.
#[derive(Debug, Default)]
pub struct FetchStats {
    cache_hits: AtomicU64,
    upstream_requests: AtomicU64,
    upstream_failures: AtomicU64,
}

impl FetchStats {
    fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_upstream_request(&self) {
        self.upstream_requests.fetch_add(1, Ordering::Relaxed);
    }

    fn record_upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> FetchStatsSummary {
        FetchStatsSummary {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            upstream_requests: self.upstream_requests.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`FetchStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchStatsSummary {
    pub cache_hits: u64,
    pub upstream_requests: u64,
    pub upstream_failures: u64,
}

/// Probe result for one configured endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointHealth {
    pub endpoint: String,
    pub healthy: bool,
}

/// Resolves pairs to current market data: allow-list gate, cache lookup,
/// then the endpoint list walked in priority order until one yields a
/// usable snapshot.
pub struct TickerFetcher {
    pairs: PairList,
    quote: String,
    endpoints: Vec<String>,
    cache: TickerCache,
    transport: Arc<dyn Transport>,
    stats: FetchStats,
}

impl TickerFetcher {
    pub fn new(config: &MarketConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            pairs: PairList::from_symbols(&config.pairs),
            quote: config.quote.clone(),
            endpoints: config.endpoints.clone(),
            cache: TickerCache::new(
                Duration::from_secs(config.cache_ttl_secs),
                config.cache_capacity,
            ),
            transport,
            stats: FetchStats::default(),
        }
    }

    /// The configured allow-list.
    pub fn pairs(&self) -> &PairList {
        &self.pairs
    }

    pub fn stats(&self) -> FetchStatsSummary {
        self.stats.summary()
    }

    /// Resolve one pair. Transient endpoint trouble is logged and absorbed
    /// by falling through to the next endpoint; only pair rejection and
    /// full exhaustion surface to the caller.
    pub async fn fetch(&self, pair: &Pair) -> Result<TickerSnapshot, FetchError> {
        if !self.pairs.contains(pair) {
            warn!(%pair, "rejected request for unlisted pair");
            return Err(FetchError::UnknownPair(pair.clone()));
        }

        if let Some(snapshot) = self.cache.get(pair) {
            self.stats.record_cache_hit();
            debug!(%pair, "serving ticker from cache");
            return Ok(snapshot);
        }

        let volume_key = format!("vol_{}", pair.base(&self.quote));

        for endpoint in &self.endpoints {
            let url = format!("{}/{}", endpoint.trim_end_matches('/'), pair);
            self.stats.record_upstream_request();

            match self.transport.get_json(&url).await {
                Ok(body) => match decode_snapshot(&body, &volume_key) {
                    Some(snapshot) => {
                        debug!(%pair, url, last = snapshot.last, "ticker fetched");
                        self.cache.insert(pair.clone(), snapshot);
                        return Ok(snapshot);
                    }
                    None => {
                        self.stats.record_upstream_failure();
                        warn!(%pair, url, "payload missing usable last price");
                    }
                },
                Err(err) => {
                    self.stats.record_upstream_failure();
                    warn!(%pair, url, error = %err, "endpoint request failed");
                }
            }
        }

        warn!(%pair, "all ticker endpoints exhausted");
        Err(FetchError::AllEndpointsFailed(pair.clone()))
    }

    /// Resolve several pairs concurrently. Each pair gets its own result;
    /// one pair failing never disturbs the others.
    pub async fn fetch_many(
        &self,
        pairs: &[Pair],
    ) -> Vec<(Pair, Result<TickerSnapshot, FetchError>)> {
        let futures: Vec<_> = pairs
            .iter()
            .map(|pair| {
                let pair = pair.clone();
                async move {
                    let result = self.fetch(&pair).await;
                    (pair, result)
                }
            })
            .collect();

        join_all(futures).await
    }

    /// Check every configured endpoint against the allow-list's reference
    /// pair. Used by the /status command; probes bypass the cache and are
    /// not counted in the fetch stats.
    pub async fn probe_endpoints(&self) -> Vec<EndpointHealth> {
        let Some(reference) = self.pairs.reference() else {
            return Vec::new();
        };
        let volume_key = format!("vol_{}", reference.base(&self.quote));

        let mut report = Vec::with_capacity(self.endpoints.len());
        for endpoint in &self.endpoints {
            let url = format!("{}/{}", endpoint.trim_end_matches('/'), reference);
            let healthy = match self.transport.get_json(&url).await {
                Ok(body) => decode_snapshot(&body, &volume_key).is_some(),
                Err(err) => {
                    debug!(url, error = %err, "endpoint probe failed");
                    false
                }
            };
            report.push(EndpointHealth {
                endpoint: endpoint.clone(),
                healthy,
            });
        }
        report
    }
}
