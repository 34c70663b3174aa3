//! Fill notifications from the broker collaborator, and trade side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a trade or of a single fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Long,
    Short,
}

impl TradeSide {
    /// +1.0 for long, -1.0 for short.
    pub fn sign(self) -> f64 {
        match self {
            TradeSide::Long => 1.0,
            TradeSide::Short => -1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            TradeSide::Long => TradeSide::Short,
            TradeSide::Short => TradeSide::Long,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TradeSide::Long => "Long",
            TradeSide::Short => "Short",
        }
    }
}

/// One execution event delivered by the broker collaborator.
///
/// `side` is the direction of the fill itself: the entry fills of a short
/// trade carry `Short`, its exit fills carry `Long`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillEvent {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub quantity: u32,
    pub side: TradeSide,
    /// Broker order label, e.g. "CORE", "RUNNER", "CORE Stop", "RUNNER Target".
    pub order_label: String,
}
