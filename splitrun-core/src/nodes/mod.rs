//! PosVol node graph — three directional-volume estimators fused by an
//! influence model.
//!
//! Each node is a pure function of recent bars to a [`NodeValue`]; the
//! graph nudges the recent-bar value toward the lower-timeframe value,
//! blends the result toward the swing value, and penalizes confidence for
//! excess disagreement between the blended value and the swing value.

pub mod lower_tf;
pub mod recent_bar;
pub mod swing;

pub use lower_tf::lower_tf_node;
pub use recent_bar::recent_bar_node;
pub use swing::swing_node;

use crate::config::EngineConfig;
use crate::domain::{Bar, BarHistory, NodeValue};
use crate::math::clamp_unit;

/// Disagreement below this threshold carries no confidence penalty.
const CONFLICT_DEADBAND: f64 = 0.25;

/// Base confidence before the conflict penalty and LTF boost.
const BASE_CONFIDENCE: f64 = 0.8;

/// Per-bar outputs of the node graph.
#[derive(Debug, Clone, Copy)]
pub struct PosVolOutputs {
    pub recent: NodeValue,
    pub swing: NodeValue,
    pub lower_tf: NodeValue,
    pub proxy: NodeValue,
}

impl PosVolOutputs {
    /// Neutral outputs used when the node graph is disabled.
    pub fn neutral() -> Self {
        Self {
            recent: NodeValue::neutral(0.8),
            swing: NodeValue::neutral(0.8),
            lower_tf: NodeValue::neutral(0.8),
            proxy: NodeValue::neutral(0.8),
        }
    }
}

/// Influence-model fusion of the three estimators.
#[derive(Debug, Clone)]
pub struct PosVolGraph {
    rb_window: usize,
    ltf_bars: usize,
    alpha: f64,
    beta: f64,
    gamma: f64,
    volume_scale: f64,
}

impl PosVolGraph {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            rb_window: config.pos_vol_rb_window,
            ltf_bars: config.pos_vol_ltf_bars,
            alpha: config.pos_vol_alpha,
            beta: config.pos_vol_beta,
            gamma: config.pos_vol_gamma,
            volume_scale: config.pos_vol_volume_scale,
        }
    }

    /// Evaluate all nodes and combine them into one proxy value.
    pub fn evaluate(&self, history: &BarHistory, ltf: Option<&[Bar]>) -> PosVolOutputs {
        let recent = recent_bar_node(history, self.rb_window);
        let swing = swing_node(history, self.volume_scale);
        let lower_tf = lower_tf_node(ltf, self.ltf_bars, self.volume_scale);

        // Nudge the recent-bar value toward the LTF value, scaled by LTF
        // confidence and the alpha coefficient.
        let rb_nudged = clamp_unit(
            recent.value + self.alpha * (lower_tf.value - 0.5) * lower_tf.confidence,
        );

        // Blend toward the swing value, weighted by swing confidence.
        let swing_w = self.beta * swing.confidence;
        let blended = (1.0 - swing_w) * rb_nudged + swing_w * swing.value;

        // Disagreement beyond the deadband erodes confidence; the LTF
        // confidence mildly boosts or dampens the result.
        let conflict = ((blended - swing.value).abs() - CONFLICT_DEADBAND).max(0.0);
        let conf = clamp_unit(BASE_CONFIDENCE * (1.0 - self.gamma * conflict));
        let ltf_boost = 1.0 + 0.1 * (lower_tf.confidence - 0.5);

        PosVolOutputs {
            recent,
            swing,
            lower_tf,
            proxy: NodeValue::new(blended, conf * ltf_boost),
        }
    }
}
