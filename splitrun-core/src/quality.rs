//! Entry-quality composite: legacy inputs, the weighted total, and the gate.

use crate::math::clamp_unit;

const WEIGHT_EPSILON: f64 = 1e-6;

/// Raw quality inputs for one bar, each in [0, 1].
///
/// When an indicator collaborator is absent the corresponding input takes
/// its neutral default, never an error.
#[derive(Debug, Clone, Copy)]
pub struct QualityInputs {
    pub space: f64,
    pub trend: f64,
    pub structural_res: f64,
    pub raw_momentum: f64,
}

impl QualityInputs {
    /// Build from optional indicator readings. Absent ADX defaults the
    /// trend input to neutral, absent RSI defaults raw momentum likewise;
    /// space and structural resistance default to fully open.
    pub fn from_indicators(adx: Option<f64>, rsi: Option<f64>) -> Self {
        Self {
            space: 1.0,
            trend: clamp_unit(adx.unwrap_or(50.0) / 100.0),
            structural_res: 1.0,
            raw_momentum: clamp_unit(rsi.unwrap_or(50.0) / 100.0),
        }
    }
}

/// Legacy composite: unweighted mean of space, trend, and structural
/// resistance.
pub fn total_old(inputs: &QualityInputs) -> f64 {
    clamp_unit((inputs.space + inputs.trend + inputs.structural_res) / 3.0)
}

/// Weighted composite. Space, trend, and structural resistance carry
/// implicit weight 1; the PosVol proxy joins only when its weight is
/// meaningfully positive. A vanishing weight sum reads 0.
pub fn total_new(inputs: &QualityInputs, pos_vol_proxy: f64, w_pos_vol: f64) -> f64 {
    let mut num = inputs.space + inputs.trend + inputs.structural_res;
    let mut denom = 3.0;
    if w_pos_vol > WEIGHT_EPSILON {
        num += w_pos_vol * pos_vol_proxy;
        denom += w_pos_vol;
    }
    if denom <= WEIGHT_EPSILON {
        return 0.0;
    }
    clamp_unit(num / denom)
}

/// Entry permission: a disabled gate always passes.
pub fn gate_permits(gate_enabled: bool, total_new: f64, min_quality: f64) -> bool {
    !gate_enabled || total_new >= min_quality
}
