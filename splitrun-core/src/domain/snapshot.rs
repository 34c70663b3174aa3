//! QualitySnapshot — per-bar fusion scalars, captured fresh each bar.

use serde::{Deserialize, Serialize};

/// The composite quality scalars for one bar.
///
/// Created by the quality composite and read by the entry gate, the sizing
/// path, and the record sinks. Not persisted across bars except as the
/// "last" copy cached for audit and for stamping completed trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySnapshot {
    pub space: f64,
    pub trend: f64,
    pub structural_res: f64,
    pub raw_momentum: f64,
    pub pos_vol_proxy: f64,
    pub pos_vol_confidence: f64,
    pub momentum_core: f64,
    pub momentum_confidence: f64,
    /// Directional-volume amplified momentum.
    pub fav_momentum: f64,
    /// Context-blended momentum (base vs favored by space/trend context).
    pub true_momentum: f64,
    pub session_weight: f64,
    /// Legacy composite: mean of space/trend/structural.
    pub total_old: f64,
    /// Weighted composite used by the entry gate.
    pub total_new: f64,
}

impl QualitySnapshot {
    /// Fully neutral snapshot used before the first bar completes.
    pub fn neutral() -> Self {
        Self {
            space: 1.0,
            trend: 0.0,
            structural_res: 1.0,
            raw_momentum: 0.5,
            pos_vol_proxy: 0.5,
            pos_vol_confidence: 0.8,
            momentum_core: 0.5,
            momentum_confidence: 0.8,
            fav_momentum: 0.5,
            true_momentum: 0.5,
            session_weight: 1.0,
            total_old: 0.0,
            total_new: 0.0,
        }
    }
}
