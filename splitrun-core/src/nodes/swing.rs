//! Swing-pivot PosVol node: signed volume accumulated since the most
//! recent confirmed pivot.

use crate::domain::{BarHistory, NodeValue};
use crate::math::squash;

/// Bars on each side that must be exceeded to confirm a pivot.
const PIVOT_LOOKBACK: usize = 3;

/// How far back (bars ago) the pivot scan reaches.
const SCAN_HORIZON: usize = 200;

/// Accumulation span cap once a pivot is found.
const MAX_SPAN: usize = 100;

/// Locate the most recent confirmed pivot high or low and squash the
/// signed volume accumulated since it.
///
/// No pivot within the horizon, or fewer than 5 bars of history, falls
/// back to neutral with low confidence.
pub fn swing_node(history: &BarHistory, volume_scale: f64) -> NodeValue {
    if history.len() < 5 {
        return NodeValue::neutral(0.3);
    }

    let pivot = find_recent_pivot(history);
    let Some(pivot_ago) = pivot else {
        return NodeValue::neutral(0.3);
    };

    let span = pivot_ago.min(MAX_SPAN).max(1);
    let mut sum = 0.0;
    for i in 0..span {
        let bar = history.ago(i).expect("span bounded by pivot index");
        sum += bar.volume as f64 * bar.direction();
    }

    let z = sum / volume_scale.max(1.0);
    NodeValue::new(squash(z), 0.85)
}

/// Scan outward from 3 bars ago and return the first bar that is a strict
/// local high or low against 3 bars on each side.
fn find_recent_pivot(history: &BarHistory) -> Option<usize> {
    let len = history.len();
    if len < 2 * PIVOT_LOOKBACK + 1 {
        return None;
    }
    let horizon = (len - PIVOT_LOOKBACK).min(SCAN_HORIZON);

    for i in PIVOT_LOOKBACK..horizon {
        let candidate = history.ago(i)?;
        let mut is_high = true;
        let mut is_low = true;
        for k in 1..=PIVOT_LOOKBACK {
            let newer = history.ago(i - k)?;
            let older = match history.ago(i + k) {
                Some(bar) => bar,
                None => {
                    is_high = false;
                    is_low = false;
                    break;
                }
            };
            if candidate.high <= newer.high || candidate.high <= older.high {
                is_high = false;
            }
            if candidate.low >= newer.low || candidate.low >= older.low {
                is_low = false;
            }
            if !is_high && !is_low {
                break;
            }
        }
        if is_high || is_low {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use chrono::{TimeZone, Utc};

    fn bar(open: f64, high: f64, low: f64, close: f64, volume: u64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Flat ramp with one spike high `spike_ago` bars back.
    fn history_with_spike(len: usize, spike_ago: usize) -> BarHistory {
        let mut hist = BarHistory::new(256);
        for i in 0..len {
            let ago = len - 1 - i;
            if ago == spike_ago {
                hist.push(bar(100.0, 110.0, 99.0, 101.0, 900));
            } else {
                hist.push(bar(100.0, 101.0, 99.0, 100.5, 600));
            }
        }
        hist
    }

    #[test]
    fn short_history_is_neutral() {
        let mut hist = BarHistory::new(32);
        for _ in 0..4 {
            hist.push(bar(100.0, 101.0, 99.0, 100.5, 500));
        }
        let nv = swing_node(&hist, 1000.0);
        assert_eq!(nv.value, 0.5);
        assert_eq!(nv.confidence, 0.3);
    }

    #[test]
    fn finds_the_most_recent_pivot() {
        let hist = history_with_spike(30, 6);
        assert_eq!(find_recent_pivot(&hist), Some(6));
    }

    #[test]
    fn nearer_pivot_wins_over_an_older_one() {
        // Spikes at 6 and 15 bars ago; the scan stops at 6.
        let mut hist = BarHistory::new(256);
        for i in 0..30 {
            let ago = 29 - i;
            if ago == 6 || ago == 15 {
                hist.push(bar(100.0, 110.0, 99.0, 101.0, 900));
            } else {
                hist.push(bar(100.0, 101.0, 99.0, 100.5, 600));
            }
        }
        assert_eq!(find_recent_pivot(&hist), Some(6));
    }

    #[test]
    fn no_pivot_in_flat_tape_is_neutral() {
        let mut hist = BarHistory::new(64);
        for _ in 0..40 {
            hist.push(bar(100.0, 101.0, 99.0, 100.5, 500));
        }
        assert_eq!(find_recent_pivot(&hist), None);
        let nv = swing_node(&hist, 1000.0);
        assert_eq!(nv.value, 0.5);
        assert_eq!(nv.confidence, 0.3);
    }

    #[test]
    fn buying_since_pivot_reads_above_neutral() {
        let mut hist = BarHistory::new(64);
        // Older context with a clear pivot low 10 bars back, then up bars.
        for i in 0..20 {
            hist.push(bar(100.0, 101.0 + i as f64 * 0.01, 99.0, 100.5, 400));
        }
        hist.push(bar(100.0, 100.5, 95.0, 100.0, 400)); // pivot low
        for _ in 0..10 {
            hist.push(bar(100.0, 102.5, 99.8, 102.0, 800)); // strong up bars
        }
        let nv = swing_node(&hist, 1000.0);
        assert!(nv.value > 0.5);
        assert_eq!(nv.confidence, 0.85);
    }

    #[test]
    fn value_is_clamped_for_huge_volume() {
        let hist = history_with_spike(40, 8);
        let nv = swing_node(&hist, 1.0);
        assert!((0.0..=1.0).contains(&nv.value));
    }
}
