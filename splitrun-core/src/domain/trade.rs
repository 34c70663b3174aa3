//! CompletedTrade — one finalized record per round-trip, and the exit
//! taxonomy.

use super::fill::TradeSide;
use super::snapshot::QualitySnapshot;
use crate::regime::Regime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a round-trip ended.
///
/// `Manual` is the defined catch-all for exits that match neither the
/// planned levels nor a named timeout order, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    Target,
    Stop,
    Breakeven,
    Timeout,
    Manual,
}

impl ExitReason {
    pub fn label(self) -> &'static str {
        match self {
            ExitReason::Target => "Target",
            ExitReason::Stop => "Stop",
            ExitReason::Breakeven => "Breakeven",
            ExitReason::Timeout => "Timeout",
            ExitReason::Manual => "Manual",
        }
    }
}

/// A complete round-trip: opening fill through closing fill.
///
/// Emitted exactly once per round-trip by the lifecycle tracker and
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedTrade {
    pub side: TradeSide,
    pub quantity: u32,

    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,

    /// Planned levels of the core leg at entry.
    pub planned_stop: f64,
    pub planned_target: f64,

    pub exit_reason: ExitReason,

    pub pnl_ticks: f64,
    pub pnl_currency: f64,
    /// P&L expressed in multiples of the core leg's risk.
    pub r_multiple: f64,

    /// Fusion scalars captured when the position opened.
    pub entry_snapshot: QualitySnapshot,
    /// Regime committed when the position opened.
    pub entry_regime: Regime,
}

impl CompletedTrade {
    pub fn holding_period(&self) -> chrono::Duration {
        self.exit_time - self.entry_time
    }

    pub fn is_winner(&self) -> bool {
        self.pnl_currency > 0.0
    }
}
