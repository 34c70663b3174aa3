//! NodeValue — the universal output of every sub-signal estimator.

use crate::math::clamp_unit;
use serde::{Deserialize, Serialize};

/// A `(value, confidence)` pair, both clamped to `[0, 1]`.
///
/// 0.5 is directional neutrality. Estimators with insufficient data return
/// `NodeValue::neutral(low_conf)` instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeValue {
    pub value: f64,
    pub confidence: f64,
}

impl NodeValue {
    /// Build a node value, clamping both fields and mapping non-finite
    /// input to the neutral 0.5. NaN never escapes an estimator.
    pub fn new(value: f64, confidence: f64) -> Self {
        Self {
            value: sanitize(value),
            confidence: sanitize(confidence),
        }
    }

    /// Neutral value 0.5 with the given confidence.
    pub fn neutral(confidence: f64) -> Self {
        Self::new(0.5, confidence)
    }
}

fn sanitize(x: f64) -> f64 {
    if x.is_finite() {
        clamp_unit(x)
    } else {
        0.5
    }
}
