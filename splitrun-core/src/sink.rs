//! Record sinks: the engine reports setup decisions, order intents, and
//! completed trades through a `RecordSink` so hosts can log them without
//! the core knowing about files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CompletedTrade, TradeSide};
use crate::regime::Regime;

/// What happened to a potential setup on this bar.
///
/// `Armed` and `Expired` exist for hosts that stage resting entries; the
/// engine's own market entries go straight to `Triggered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStatus {
    Armed,
    Triggered,
    Expired,
    Skipped,
}

/// One setup decision record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupEvent {
    pub timestamp: DateTime<Utc>,
    pub status: SetupStatus,
    pub side: TradeSide,
    pub reason: String,
    pub price: f64,
    pub total_new: f64,
    pub session_weight: f64,
    pub regime: Regime,
}

/// Which leg of the split an intent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeLeg {
    Core,
    Runner,
}

impl TradeLeg {
    pub fn order_label(&self) -> &'static str {
        match self {
            TradeLeg::Core => "CORE",
            TradeLeg::Runner => "RUNNER",
        }
    }
}

/// One leg the engine wants the broker to work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeIntent {
    pub timestamp: DateTime<Utc>,
    pub leg: TradeLeg,
    pub side: TradeSide,
    pub quantity: u32,
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
}

/// Output seam between the engine and the host.
pub trait RecordSink {
    fn setup_event(&mut self, event: &SetupEvent);
    fn trade_intent(&mut self, intent: &TradeIntent);
    fn trade_completed(&mut self, trade: &CompletedTrade);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl RecordSink for NullSink {
    fn setup_event(&mut self, _event: &SetupEvent) {}
    fn trade_intent(&mut self, _intent: &TradeIntent) {}
    fn trade_completed(&mut self, _trade: &CompletedTrade) {}
}

/// Captures everything, for tests and replay comparison.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub setups: Vec<SetupEvent>,
    pub intents: Vec<TradeIntent>,
    pub trades: Vec<CompletedTrade>,
}

impl RecordSink for MemorySink {
    fn setup_event(&mut self, event: &SetupEvent) {
        self.setups.push(event.clone());
    }

    fn trade_intent(&mut self, intent: &TradeIntent) {
        self.intents.push(intent.clone());
    }

    fn trade_completed(&mut self, trade: &CompletedTrade) {
        self.trades.push(trade.clone());
    }
}
