//! Lower-timeframe PosVol node: signed volume over the newest K bars of a
//! finer-granularity series, when the host provides one.

use crate::domain::{Bar, NodeValue};
use crate::math::squash;

/// Squash the signed volume of the most recent `k` lower-timeframe bars.
///
/// An absent or empty series yields the neutral value with moderate
/// confidence; the recent-bar and swing nodes then carry the weight.
pub fn lower_tf_node(series: Option<&[Bar]>, k: usize, volume_scale: f64) -> NodeValue {
    let Some(bars) = series else {
        return NodeValue::neutral(0.7);
    };
    if bars.is_empty() {
        return NodeValue::neutral(0.7);
    }

    let span = k.max(1).min(bars.len());
    let mut sum = 0.0;
    for bar in bars.iter().rev().take(span) {
        sum += bar.volume as f64 * bar.direction();
    }

    let z = sum / volume_scale.max(1.0);
    NodeValue::new(squash(z), 0.7)
}
