//! Congestion measure: fraction of recent bars with tiny bodies relative
//! to the window's full range.

use crate::domain::BarHistory;

/// Body at or below this share of the window range counts as congested.
const BODY_SHARE: f64 = 0.25;

/// Fraction of the last `lookback` bars whose body is small against the
/// window's high-low range. Fewer than 2 bars reads 0.0 (unknown, not
/// congested); a window range of one tick or less reads fully congested.
pub fn congestion_fraction(history: &BarHistory, lookback: usize, tick_size: f64) -> f64 {
    let span = lookback.min(history.len());
    if span < 2 {
        return 0.0;
    }

    let Some((high, low)) = history.window_extremes(span) else {
        return 0.0;
    };
    let range = high - low;
    if range <= tick_size {
        return 1.0;
    }

    let mut small = 0usize;
    for i in 0..span {
        let bar = history.ago(i).expect("span bounded by len");
        if (bar.close - bar.open).abs() <= BODY_SHARE * range {
            small += 1;
        }
    }
    small as f64 / span as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use chrono::{TimeZone, Utc};

    fn bar(open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: 500,
        }
    }

    #[test]
    fn too_little_history_reads_zero() {
        let mut hist = BarHistory::new(8);
        hist.push(bar(100.0, 101.0, 99.0, 100.5));
        assert_eq!(congestion_fraction(&hist, 20, 0.25), 0.0);
    }

    #[test]
    fn flat_tape_is_fully_congested() {
        let mut hist = BarHistory::new(32);
        for _ in 0..10 {
            hist.push(bar(100.0, 100.25, 100.0, 100.1));
        }
        assert_eq!(congestion_fraction(&hist, 10, 0.25), 1.0);
    }

    #[test]
    fn trending_bars_read_low_congestion() {
        let mut hist = BarHistory::new(64);
        for i in 0..20 {
            let base = 100.0 + i as f64 * 2.0;
            hist.push(bar(base, base + 2.2, base - 0.2, base + 2.0));
        }
        // Window range is 40 points; each 2-point body clears 25% easily?
        // 0.25 * 40 = 10, so every body counts as small here.
        assert_eq!(congestion_fraction(&hist, 20, 0.25), 1.0);
        // A short window makes the same bodies large against the range.
        // Range over 3 bars ≈ 6.4; 0.25 * 6.4 = 1.6 < 2.0 body.
        assert_eq!(congestion_fraction(&hist, 3, 0.25), 0.0);
    }

    #[test]
    fn mixed_window_counts_the_small_bodies() {
        let mut hist = BarHistory::new(32);
        // Range anchors: one wide bar, then small-bodied bars inside it.
        hist.push(bar(100.0, 110.0, 90.0, 108.0));
        for _ in 0..3 {
            hist.push(bar(100.0, 101.0, 99.0, 100.5)); // body 0.5 <= 5.0
        }
        // 3 of 4 bodies are small (the wide bar's 8-point body exceeds 5).
        let frac = congestion_fraction(&hist, 4, 0.25);
        assert!((frac - 0.75).abs() < 1e-12);
    }
}
