//! Fixed-window rolling statistics with a z-score update.
//!
//! The window is a bounded FIFO: pushing the (N+1)-th sample evicts the
//! oldest. Variance is the population variance over the current contents.
//! Fewer than `MIN_SAMPLES` samples, or variance below the numerical
//! floor, yields the neutral z of 0.0 instead of a divide-by-near-zero.

use std::collections::VecDeque;

/// Minimum samples before a z-score is meaningful.
const MIN_SAMPLES: usize = 3;

/// Variance floor below which the window is treated as constant.
const VAR_FLOOR: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct RollingStats {
    capacity: usize,
    window: VecDeque<f64>,
}

impl RollingStats {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "RollingStats capacity must be >= 1");
        Self {
            capacity,
            window: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Push a sample and return its z-score against the updated window.
    ///
    /// Returns 0.0 while fewer than 3 samples are held and whenever the
    /// window variance is below the numerical floor.
    pub fn update(&mut self, value: f64) -> f64 {
        self.window.push_back(value);
        if self.window.len() > self.capacity {
            self.window.pop_front();
        }

        let n = self.window.len();
        if n < MIN_SAMPLES {
            return 0.0;
        }

        let mut sum = 0.0;
        for &v in &self.window {
            sum += v;
        }
        let mean = sum / n as f64;

        // Centered accumulation: the naive E[x^2] - mean^2 form cancels
        // catastrophically for large-magnitude windows and can report a
        // phantom variance on constant input.
        let mut var = 0.0;
        for &v in &self.window {
            let d = v - mean;
            var += d * d;
        }
        var /= n as f64;
        if var < VAR_FLOOR {
            return 0.0;
        }
        (value - mean) / var.sqrt()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
