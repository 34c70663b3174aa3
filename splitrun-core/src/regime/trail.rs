//! Trail-mode hysteresis: debounce a desired mode before flipping, then
//! hold through a cooldown so the mode cannot flap bar to bar.

use serde::{Deserialize, Serialize};

/// Active trailing-stop style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrailMode {
    RangeBased,
    VolatilityBased,
}

/// Debounce-then-cooldown selector.
#[derive(Debug, Clone)]
pub struct TrailSelector {
    mode: TrailMode,
    debounce_bars: u32,
    cooldown_bars: u32,
    debounce: u32,
    cooldown: u32,
}

impl TrailSelector {
    pub fn new(debounce_bars: u32, cooldown_bars: u32) -> Self {
        Self {
            mode: TrailMode::RangeBased,
            debounce_bars,
            cooldown_bars,
            debounce: 0,
            cooldown: 0,
        }
    }

    pub fn mode(&self) -> TrailMode {
        self.mode
    }

    /// Advance one bar. The desired mode is volatility-based exactly when
    /// the tape is not congested; persistent disagreement flips the mode
    /// once the debounce is met and no cooldown is pending.
    pub fn update(&mut self, congestion: f64, threshold: f64) -> TrailMode {
        let desired = if congestion < threshold {
            TrailMode::VolatilityBased
        } else {
            TrailMode::RangeBased
        };

        if desired == self.mode {
            self.debounce = 0;
        } else {
            self.debounce += 1;
            if self.debounce >= self.debounce_bars && self.cooldown == 0 {
                self.mode = desired;
                self.debounce = 0;
                self.cooldown = self.cooldown_bars.max(1);
            }
        }

        // Cooldown ticks down after the flip check, so a fresh flip holds
        // for the full cooldown window.
        self.cooldown = self.cooldown.saturating_sub(1);
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_range_based() {
        let sel = TrailSelector::new(3, 2);
        assert_eq!(sel.mode(), TrailMode::RangeBased);
    }

    #[test]
    fn flips_only_after_debounce() {
        let mut sel = TrailSelector::new(3, 2);
        // Quiet tape wants volatility-based; two bars are not enough.
        assert_eq!(sel.update(0.1, 0.6), TrailMode::RangeBased);
        assert_eq!(sel.update(0.1, 0.6), TrailMode::RangeBased);
        // Third disagreeing bar meets the debounce.
        assert_eq!(sel.update(0.1, 0.6), TrailMode::VolatilityBased);
    }

    #[test]
    fn agreement_resets_the_debounce() {
        let mut sel = TrailSelector::new(3, 2);
        sel.update(0.1, 0.6);
        sel.update(0.1, 0.6);
        // One agreeing bar wipes the progress.
        sel.update(0.9, 0.6);
        sel.update(0.1, 0.6);
        sel.update(0.1, 0.6);
        assert_eq!(sel.mode(), TrailMode::RangeBased);
        assert_eq!(sel.update(0.1, 0.6), TrailMode::VolatilityBased);
    }

    #[test]
    fn cooldown_blocks_an_immediate_flip_back() {
        let mut sel = TrailSelector::new(1, 5);
        assert_eq!(sel.update(0.1, 0.6), TrailMode::VolatilityBased);
        // Congested again right away; the cooldown pins the mode.
        for _ in 0..4 {
            assert_eq!(sel.update(0.9, 0.6), TrailMode::VolatilityBased);
        }
        // Cooldown expired, debounce already met.
        assert_eq!(sel.update(0.9, 0.6), TrailMode::RangeBased);
    }

    #[test]
    fn alternating_tape_never_flips_with_a_real_debounce() {
        let mut sel = TrailSelector::new(2, 2);
        for i in 0..50 {
            let congestion = if i % 2 == 0 { 0.1 } else { 0.9 };
            assert_eq!(sel.update(congestion, 0.6), TrailMode::RangeBased);
        }
    }
}
