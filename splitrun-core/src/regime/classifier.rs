//! Regime classifier: debounced, rate-limited commitment to one of three
//! market regimes from volatility state and congestion.

use super::Regime;

/// Coarse volatility reading the engine derives from ATR against its
/// smoothed baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolState {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    current: Regime,
    pending: Regime,
    pending_count: u32,
    bars_since_switch: u32,
    hold_bars: u32,
    switch_interval: u32,
    congestion_low: f64,
    congestion_high: f64,
}

impl RegimeClassifier {
    pub fn new(hold_bars: u32, switch_interval: u32, congestion_low: f64, congestion_high: f64) -> Self {
        Self {
            current: Regime::Default,
            pending: Regime::Default,
            pending_count: 0,
            bars_since_switch: switch_interval,
            hold_bars,
            switch_interval,
            congestion_low,
            congestion_high,
        }
    }

    pub fn regime(&self) -> Regime {
        self.current
    }

    /// Advance one bar and return the committed regime. A switch requires
    /// the candidate to persist for `hold_bars` AND the last switch to be
    /// at least `switch_interval` bars old; both gates must pass on the
    /// same bar.
    pub fn update(&mut self, vol: VolState, congestion: f64) -> Regime {
        let candidate = match vol {
            VolState::High if congestion < self.congestion_low => Regime::TrendRoomy,
            VolState::Low if congestion > self.congestion_high => Regime::StrictChop,
            _ => Regime::Default,
        };

        if candidate == self.pending {
            self.pending_count += 1;
        } else {
            self.pending = candidate;
            self.pending_count = 1;
        }

        if candidate != self.current
            && self.pending_count >= self.hold_bars
            && self.bars_since_switch >= self.switch_interval
        {
            self.current = candidate;
            self.bars_since_switch = 0;
        } else {
            self.bars_since_switch = self.bars_since_switch.saturating_add(1);
        }
        self.current
    }
}
