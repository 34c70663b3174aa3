//! Bar — the fundamental market data unit, plus the bounded history the
//! engine owns.
//!
//! All components index history by "bars ago": 0 is the bar being
//! processed, 1 the one before it. `BarHistory` enforces the bound so a
//! long run never grows past the largest configured lookback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// High-low range of the bar.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// |close - open| as a fraction of the range; 0.0 on a zero-range bar.
    pub fn body_ratio(&self) -> f64 {
        let range = self.range();
        if range > 0.0 {
            (self.close - self.open).abs() / range
        } else {
            0.0
        }
    }

    /// +1 for an up bar, -1 for a down bar, 0 for a doji.
    pub fn direction(&self) -> f64 {
        if self.close > self.open {
            1.0
        } else if self.close < self.open {
            -1.0
        } else {
            0.0
        }
    }

    /// Basic OHLC sanity check: high bounds the bar, prices positive.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Bounded FIFO of observed bars with bars-ago indexing.
#[derive(Debug, Clone)]
pub struct BarHistory {
    capacity: usize,
    // Newest last; ago(0) reads the back.
    bars: std::collections::VecDeque<Bar>,
}

impl BarHistory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "BarHistory capacity must be >= 1");
        Self {
            capacity,
            bars: std::collections::VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn push(&mut self, bar: Bar) {
        self.bars.push_back(bar);
        if self.bars.len() > self.capacity {
            self.bars.pop_front();
        }
    }

    /// Bar `n` bars ago; `None` when history is shorter than that.
    pub fn ago(&self, n: usize) -> Option<&Bar> {
        let len = self.bars.len();
        if n < len {
            self.bars.get(len - 1 - n)
        } else {
            None
        }
    }

    /// Close `n` bars ago, falling back to the current close when history
    /// is too short. Matches the neutral-fallback convention: a missing
    /// older close contributes zero change, not an error.
    pub fn close_ago_or_current(&self, n: usize) -> f64 {
        match self.ago(n) {
            Some(bar) => bar.close,
            None => self.ago(0).map(|b| b.close).unwrap_or(0.0),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Highest high and lowest low over the most recent `n` bars.
    /// `None` when the history is empty.
    pub fn window_extremes(&self, n: usize) -> Option<(f64, f64)> {
        if self.bars.is_empty() {
            return None;
        }
        let span = n.min(self.bars.len());
        let mut hi = f64::MIN;
        let mut lo = f64::MAX;
        for i in 0..span {
            let bar = self.ago(i).expect("span bounded by len");
            if bar.high > hi {
                hi = bar.high;
            }
            if bar.low < lo {
                lo = bar.low;
            }
        }
        Some((hi, lo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap(),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn body_ratio_and_direction() {
        let b = bar(100.0); // body 0.5, range 2.0
        assert!((b.body_ratio() - 0.25).abs() < 1e-12);
        assert_eq!(b.direction(), 1.0);
    }

    #[test]
    fn zero_range_bar_has_zero_body_ratio() {
        let mut b = bar(100.0);
        b.high = 100.0;
        b.low = 100.0;
        b.open = 100.0;
        assert_eq!(b.body_ratio(), 0.0);
        assert_eq!(b.direction(), 0.0);
    }

    #[test]
    fn ago_indexing_is_newest_first() {
        let mut hist = BarHistory::new(10);
        hist.push(bar(100.0));
        hist.push(bar(101.0));
        hist.push(bar(102.0));
        assert_eq!(hist.ago(0).unwrap().close, 102.0);
        assert_eq!(hist.ago(2).unwrap().close, 100.0);
        assert!(hist.ago(3).is_none());
    }

    #[test]
    fn history_is_bounded() {
        let mut hist = BarHistory::new(3);
        for i in 0..8 {
            hist.push(bar(100.0 + i as f64));
        }
        assert_eq!(hist.len(), 3);
        assert_eq!(hist.ago(0).unwrap().close, 107.0);
        assert_eq!(hist.ago(2).unwrap().close, 105.0);
    }

    #[test]
    fn close_ago_falls_back_to_current() {
        let mut hist = BarHistory::new(10);
        hist.push(bar(100.0));
        assert_eq!(hist.close_ago_or_current(5), 100.0);
    }

    #[test]
    fn window_extremes_cover_the_span() {
        let mut hist = BarHistory::new(10);
        hist.push(bar(100.0));
        hist.push(bar(105.0));
        hist.push(bar(95.0));
        let (hi, lo) = hist.window_extremes(3).unwrap();
        assert_eq!(hi, 106.0);
        assert_eq!(lo, 94.0);
    }
}
