//! Streaming exponential moving average.
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], with
//! alpha = 2 / (period + 1). The first update seeds the state with the
//! sample itself, so there is no cold-start smoothing bias.

#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    value: f64,
    seeded: bool,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            alpha: 2.0 / (period as f64 + 1.0),
            value: 0.0,
            seeded: false,
        }
    }

    /// Incorporate a sample and return the updated average.
    ///
    /// After the seeding call the value is always a convex combination of
    /// the previous value and the new sample.
    pub fn update(&mut self, x: f64) -> f64 {
        if self.seeded {
            self.value = self.alpha * x + (1.0 - self.alpha) * self.value;
        } else {
            self.value = x;
            self.seeded = true;
        }
        self.value
    }

    /// Current value, or `None` before the first update.
    pub fn value(&self) -> Option<f64> {
        self.seeded.then_some(self.value)
    }
}
