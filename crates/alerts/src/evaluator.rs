//! Periodic alert evaluation.

use crate::notifier::{format_trigger_message, Notifier};
use crate::registry::AlertRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tickerbot_core::Pair;
use tickerbot_market::TickerFetcher;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Evaluator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Seconds between evaluation cycles.
    pub interval_secs: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self { interval_secs: 120 }
    }
}

/// What one evaluation cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Subscriptions considered this cycle.
    pub evaluated: usize,
    /// Notifications delivered (subscriptions consumed).
    pub fired: usize,
    /// Distinct pairs whose fetch failed and were skipped.
    pub fetch_failures: usize,
}

/// Walks the registry on a fixed interval, fetching each referenced pair
/// once and firing one-shot notifications for met targets.
pub struct AlertEvaluator {
    registry: Arc<AlertRegistry>,
    fetcher: Arc<TickerFetcher>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
}

impl AlertEvaluator {
    pub fn new(
        registry: Arc<AlertRegistry>,
        fetcher: Arc<TickerFetcher>,
        notifier: Arc<dyn Notifier>,
        config: &EvaluatorConfig,
    ) -> Self {
        Self {
            registry,
            fetcher,
            notifier,
            interval: Duration::from_secs(config.interval_secs),
        }
    }

    /// Run forever on the configured interval.
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "alert evaluator started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let report = self.evaluate_once().await;
            if report.evaluated > 0 {
                debug!(
                    evaluated = report.evaluated,
                    fired = report.fired,
                    fetch_failures = report.fetch_failures,
                    "alert cycle complete"
                );
            }
        }
    }

    /// One evaluation cycle: snapshot subscriptions, fetch each distinct
    /// pair once, fire-and-consume every met target. A pair that fails to
    /// fetch only skips its own subscriptions until the next cycle.
    pub async fn evaluate_once(&self) -> CycleReport {
        let subscriptions = self.registry.snapshot();
        if subscriptions.is_empty() {
            return CycleReport::default();
        }

        let mut pairs: Vec<Pair> = Vec::new();
        for subscription in &subscriptions {
            if !pairs.contains(&subscription.pair) {
                pairs.push(subscription.pair.clone());
            }
        }

        let mut prices = HashMap::new();
        let mut fetch_failures = 0;
        for (pair, result) in self.fetcher.fetch_many(&pairs).await {
            match result {
                Ok(snapshot) => {
                    prices.insert(pair, snapshot);
                }
                Err(err) => {
                    warn!(%pair, error = %err, "skipping alerts for pair this cycle");
                    fetch_failures += 1;
                }
            }
        }

        let mut fired = 0;
        for subscription in &subscriptions {
            let Some(snapshot) = prices.get(&subscription.pair) else {
                continue;
            };
            if snapshot.last < subscription.target_price {
                continue;
            }
            // Consume the subscription before dispatch: the alert fires at
            // most once even if delivery fails or cycles overlap.
            if !self.registry.claim(subscription) {
                continue;
            }

            let text = format_trigger_message(subscription, snapshot);
            match self.notifier.notify(subscription.subscriber, &text).await {
                Ok(()) => {
                    info!(
                        subscriber = %subscription.subscriber,
                        pair = %subscription.pair,
                        target = subscription.target_price,
                        last = snapshot.last,
                        "price alert delivered"
                    );
                    fired += 1;
                }
                Err(err) => {
                    error!(
                        subscriber = %subscription.subscriber,
                        pair = %subscription.pair,
                        error = %err,
                        "failed to deliver price alert"
                    );
                }
            }
        }

        CycleReport {
            evaluated: subscriptions.len(),
            fired,
            fetch_failures,
        }
    }
}
