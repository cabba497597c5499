//! In-memory registry of price alert subscriptions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;
use tickerbot_core::{Pair, PairList};

/// Chat identity that registered an alert and receives its notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub i64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One armed alert: fires once when the pair's last price reaches the
/// target, then disappears.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSubscription {
    pub subscriber: SubscriberId,
    pub pair: Pair,
    pub target_price: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlertError {
    #[error("unknown trading pair: {0}")]
    UnknownPair(Pair),

    #[error("target price must be a positive number, got {0}")]
    InvalidTarget(f64),
}

/// Subscriber -> subscription map. At most one alert per subscriber;
/// setting a new one silently replaces the old. All operations take the
/// lock briefly and never hold it across I/O.
pub struct AlertRegistry {
    pairs: PairList,
    inner: Mutex<HashMap<SubscriberId, AlertSubscription>>,
}

impl AlertRegistry {
    pub fn new(pairs: PairList) -> Self {
        Self {
            pairs,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Arm an alert, replacing any existing one for the subscriber.
    /// Returns the replaced subscription, if any.
    pub fn set(
        &self,
        subscriber: SubscriberId,
        pair: Pair,
        target_price: f64,
    ) -> Result<Option<AlertSubscription>, AlertError> {
        if !self.pairs.contains(&pair) {
            return Err(AlertError::UnknownPair(pair));
        }
        if !(target_price.is_finite() && target_price > 0.0) {
            return Err(AlertError::InvalidTarget(target_price));
        }

        let subscription = AlertSubscription {
            subscriber,
            pair,
            target_price,
        };
        let mut inner = self.inner.lock().expect("alert registry lock poisoned");
        Ok(inner.insert(subscriber, subscription))
    }

    /// Disarm a subscriber's alert, returning it if one was set.
    pub fn remove(&self, subscriber: SubscriberId) -> Option<AlertSubscription> {
        let mut inner = self.inner.lock().expect("alert registry lock poisoned");
        inner.remove(&subscriber)
    }

    /// Clone out all current subscriptions so the evaluator can work
    /// without holding the lock during network I/O.
    pub fn snapshot(&self) -> Vec<AlertSubscription> {
        let inner = self.inner.lock().expect("alert registry lock poisoned");
        inner.values().cloned().collect()
    }

    /// Atomically consume a subscription observed in an earlier snapshot.
    /// Succeeds only while the stored entry still matches, so a triggered
    /// alert has exactly one winner even when evaluation overlaps with a
    /// replacement or a concurrent cycle.
    pub fn claim(&self, subscription: &AlertSubscription) -> bool {
        let mut inner = self.inner.lock().expect("alert registry lock poisoned");
        match inner.get(&subscription.subscriber) {
            Some(current)
                if current.pair == subscription.pair
                    && current.target_price == subscription.target_price =>
            {
                inner.remove(&subscription.subscriber);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("alert registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry() -> AlertRegistry {
        AlertRegistry::new(PairList::from_symbols(&["btcidr", "ethidr"]))
    }

    #[test]
    fn test_set_validates_pair() {
        let registry = registry();
        let err = registry
            .set(SubscriberId(1), Pair::new("dogeusd"), 100.0)
            .unwrap_err();
        assert_eq!(err, AlertError::UnknownPair(Pair::new("dogeusd")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_set_validates_target() {
        let registry = registry();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(registry
                .set(SubscriberId(1), Pair::new("btcidr"), bad)
                .is_err());
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_set_replaces_previous_subscription() {
        let registry = registry();
        registry
            .set(SubscriberId(1), Pair::new("btcidr"), 100.0)
            .unwrap();
        let replaced = registry
            .set(SubscriberId(1), Pair::new("ethidr"), 200.0)
            .unwrap()
            .unwrap();

        assert_eq!(replaced.pair, Pair::new("btcidr"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot()[0].pair, Pair::new("ethidr"));
    }

    #[test]
    fn test_remove() {
        let registry = registry();
        registry
            .set(SubscriberId(7), Pair::new("btcidr"), 50.0)
            .unwrap();

        assert!(registry.remove(SubscriberId(7)).is_some());
        assert!(registry.remove(SubscriberId(7)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_claim_consumes_matching_subscription_once() {
        let registry = registry();
        registry
            .set(SubscriberId(1), Pair::new("btcidr"), 100.0)
            .unwrap();
        let snapshot = registry.snapshot();

        assert!(registry.claim(&snapshot[0]));
        assert!(!registry.claim(&snapshot[0]));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_claim_rejects_stale_snapshot_after_replacement() {
        let registry = registry();
        registry
            .set(SubscriberId(1), Pair::new("btcidr"), 100.0)
            .unwrap();
        let stale = registry.snapshot();

        registry
            .set(SubscriberId(1), Pair::new("btcidr"), 999.0)
            .unwrap();

        assert!(!registry.claim(&stale[0]));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot()[0].target_price, 999.0);
    }
}
