//! Price alert system for the ticker bot.
//!
//! This crate provides:
//! - the in-memory alert registry (one active alert per subscriber)
//! - the periodic evaluator that checks targets against live prices
//! - Telegram delivery of triggered alerts

pub mod evaluator;
pub mod notifier;
pub mod registry;

pub use evaluator::{AlertEvaluator, CycleReport, EvaluatorConfig};
pub use notifier::{format_trigger_message, Notifier, NotifyError, TelegramNotifier};
pub use registry::{AlertError, AlertRegistry, AlertSubscription, SubscriberId};
