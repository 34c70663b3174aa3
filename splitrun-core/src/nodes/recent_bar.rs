//! Recent-bar PosVol node: body-weighted signed volume over a short window.

use crate::domain::{BarHistory, NodeValue};
use crate::math::squash_z;

const Z_DIVISOR: f64 = 2.0;

/// Accumulate `volume * direction * (0.6 + 0.4 * body_ratio)` over the
/// last `window` bars and squash a bounded z-like normalization of the sum.
///
/// Fewer than 3 bars → neutral with low confidence.
pub fn recent_bar_node(history: &BarHistory, window: usize) -> NodeValue {
    let span = window.min(history.len());
    if span <= 2 {
        return NodeValue::neutral(0.2);
    }

    let mut sum = 0.0;
    for i in 0..span {
        let bar = history.ago(i).expect("span bounded by len");
        let signed = bar.volume as f64 * bar.direction() * (0.6 + 0.4 * bar.body_ratio());
        sum += signed;
    }

    // Bounded denominator: sqrt of the mean magnitude, floored at 1, keeps
    // the z from scaling with raw contract volume.
    let mean = sum / span as f64;
    let std = mean.abs().sqrt().max(1.0);
    let z = (sum - mean) / std;
    NodeValue::new(squash_z(z, Z_DIVISOR), 0.7)
}
