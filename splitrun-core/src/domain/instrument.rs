//! Instrument metadata: tick size and point value.

use serde::{Deserialize, Serialize};

/// Futures instrument metadata used for tick math and P&L conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instrument {
    pub symbol: String,
    pub tick_size: f64,
    pub point_value: f64,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, tick_size: f64, point_value: f64) -> Self {
        assert!(tick_size > 0.0, "tick_size must be positive");
        assert!(point_value > 0.0, "point_value must be positive");
        Self {
            symbol: symbol.into(),
            tick_size,
            point_value,
        }
    }

    /// USD value of one tick: point value * tick size.
    pub fn tick_value(&self) -> f64 {
        self.point_value * self.tick_size
    }

    /// Price distance expressed in ticks.
    pub fn ticks(&self, distance: f64) -> f64 {
        distance / self.tick_size
    }

    /// Half a tick: the tolerance used for fill dedup and exit matching.
    pub fn half_tick(&self) -> f64 {
        self.tick_size / 2.0
    }
}
