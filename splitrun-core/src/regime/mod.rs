//! Volatility/congestion regime machinery: the congestion measure, the
//! trail-mode hysteresis, and the regime classifier.
//!
//! Both state machines share the same discipline: a condition must persist
//! before it changes anything, and changes are rate-limited afterwards.

pub mod classifier;
pub mod congestion;
pub mod trail;

pub use classifier::{RegimeClassifier, VolState};
pub use congestion::congestion_fraction;
pub use trail::{TrailMode, TrailSelector};

use serde::{Deserialize, Serialize};

/// Committed market regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    Default,
    StrictChop,
    TrendRoomy,
}

impl Regime {
    pub fn label(&self) -> &'static str {
        match self {
            Regime::Default => "default",
            Regime::StrictChop => "strict_chop",
            Regime::TrendRoomy => "trend_roomy",
        }
    }
}
