//! Flat run configuration with startup validation.
//!
//! Every knob is read once at initialization and treated as immutable for
//! the run. `validate()` is the only place configuration can hard-fail;
//! the per-bar path assumes a validated config and never re-checks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shape of the session-weight proximity curve around the anchor time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionShape {
    Box,
    Triangular,
    Gaussian,
}

/// Validation failure for one configuration field.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be >= 1 (got {value})")]
    NonPositivePeriod { name: &'static str, value: usize },

    #[error("{name} must be within [0, 1] (got {value})")]
    WeightOutOfRange { name: &'static str, value: f64 },

    #[error("{name} must be within [{min}, {max}] (got {value})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{low_name} ({low}) must not exceed {high_name} ({high})")]
    InvertedRange {
        low_name: &'static str,
        low: f64,
        high_name: &'static str,
        high: f64,
    },

    #[error("{name} must be finite (got {value})")]
    NotFinite { name: &'static str, value: f64 },
}

/// All engine options: feature toggles, weights, windows, thresholds, and
/// hysteresis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // ── Feature toggles ──
    pub use_momentum_core: bool,
    pub use_pos_vol_nodes: bool,
    pub use_quality_gate: bool,
    pub apply_runner_management: bool,
    pub use_session_anchor: bool,
    /// Test override: force runner eligibility regardless of thresholds.
    pub force_runner_eligible: bool,

    // ── PosVol node graph ──
    pub pos_vol_rb_window: usize,
    pub pos_vol_ltf_bars: usize,
    /// LTF influence on the recent-bar value.
    pub pos_vol_alpha: f64,
    /// Swing influence on the blended value.
    pub pos_vol_beta: f64,
    /// Conflict penalty on confidence.
    pub pos_vol_gamma: f64,
    /// Divisor for signed-volume normalization in swing/LTF nodes.
    pub pos_vol_volume_scale: f64,
    /// Session blend weight applied to the proxy.
    pub pos_vol_session_blend: f64,

    // ── Momentum core ──
    pub momentum_roc_lookback: usize,
    pub momentum_z_lookback: usize,
    pub tsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub er_lookback: usize,
    pub streak_window: usize,
    pub w_momentum_roc: f64,
    pub w_momentum_tsi: f64,
    pub w_momentum_macd: f64,
    pub w_momentum_er: f64,
    pub w_momentum_streak: f64,
    /// Directional-volume amplifier for the favored-momentum family.
    pub fav_momentum_amplifier: f64,

    // ── Quality composite ──
    pub w_pos_vol_proxy: f64,
    pub min_quality: f64,

    // ── Session weight ──
    pub anchor_hour: u32,
    pub anchor_minute: u32,
    pub session_shape: SessionShape,
    pub session_window_mins: f64,
    pub session_pre_scale: f64,
    pub session_post_scale: f64,

    // ── Congestion + trail hysteresis ──
    pub congestion_lookback: usize,
    pub congestion_threshold: f64,
    pub trail_debounce_bars: u32,
    pub trail_cooldown_bars: u32,

    // ── Regime classifier ──
    pub regime_congestion_low: f64,
    pub regime_congestion_high: f64,
    pub regime_hold_bars: u32,
    pub regime_switch_interval: u32,

    // ── Runner split sizing ──
    pub base_contracts: u32,
    pub runner_k1: f64,
    pub runner_k2: f64,
    pub min_runway_r: f64,
    pub min_runner_momentum: f64,
    pub runner_r_min: f64,
    pub runner_r_max: f64,
    /// Minimum risk floor in ticks when the bar range is degenerate.
    pub min_risk_ticks: u32,
    /// Order label that marks a runner-timeout cancellation fill.
    pub timeout_order_label: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            use_momentum_core: true,
            use_pos_vol_nodes: true,
            use_quality_gate: true,
            apply_runner_management: true,
            use_session_anchor: false,
            force_runner_eligible: false,

            pos_vol_rb_window: 20,
            pos_vol_ltf_bars: 3,
            pos_vol_alpha: 0.25,
            pos_vol_beta: 0.25,
            pos_vol_gamma: 0.0,
            pos_vol_volume_scale: 1000.0,
            pos_vol_session_blend: 0.15,

            momentum_roc_lookback: 10,
            momentum_z_lookback: 100,
            tsi_period: 13,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            er_lookback: 10,
            streak_window: 5,
            w_momentum_roc: 0.2,
            w_momentum_tsi: 0.2,
            w_momentum_macd: 0.2,
            w_momentum_er: 0.2,
            w_momentum_streak: 0.2,
            fav_momentum_amplifier: 0.5,

            w_pos_vol_proxy: 1.0,
            min_quality: 0.55,

            anchor_hour: 9,
            anchor_minute: 30,
            session_shape: SessionShape::Gaussian,
            session_window_mins: 60.0,
            session_pre_scale: 1.0,
            session_post_scale: 1.0,

            congestion_lookback: 20,
            congestion_threshold: 0.6,
            trail_debounce_bars: 20,
            trail_cooldown_bars: 10,

            regime_congestion_low: 0.35,
            regime_congestion_high: 0.65,
            regime_hold_bars: 5,
            regime_switch_interval: 20,

            base_contracts: 1,
            runner_k1: 0.5,
            runner_k2: 0.5,
            min_runway_r: 0.0,
            min_runner_momentum: 0.0,
            runner_r_min: 1.5,
            runner_r_max: 6.0,
            min_risk_ticks: 4,
            timeout_order_label: "Timeout".to_string(),
        }
    }
}

impl EngineConfig {
    /// Reject invalid configuration before the run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("pos_vol_rb_window", self.pos_vol_rb_window),
            ("pos_vol_ltf_bars", self.pos_vol_ltf_bars),
            ("momentum_roc_lookback", self.momentum_roc_lookback),
            ("momentum_z_lookback", self.momentum_z_lookback),
            ("tsi_period", self.tsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("er_lookback", self.er_lookback),
            ("streak_window", self.streak_window),
            ("congestion_lookback", self.congestion_lookback),
        ] {
            if value < 1 {
                return Err(ConfigError::NonPositivePeriod { name, value });
            }
        }

        for (name, value) in [
            ("trail_debounce_bars", self.trail_debounce_bars),
            ("trail_cooldown_bars", self.trail_cooldown_bars),
            ("regime_hold_bars", self.regime_hold_bars),
            ("regime_switch_interval", self.regime_switch_interval),
            ("base_contracts", self.base_contracts),
            ("min_risk_ticks", self.min_risk_ticks),
        ] {
            if value < 1 {
                return Err(ConfigError::NonPositivePeriod {
                    name,
                    value: value as usize,
                });
            }
        }

        for (name, value) in [
            ("pos_vol_alpha", self.pos_vol_alpha),
            ("pos_vol_beta", self.pos_vol_beta),
            ("pos_vol_gamma", self.pos_vol_gamma),
            ("pos_vol_session_blend", self.pos_vol_session_blend),
            ("w_momentum_roc", self.w_momentum_roc),
            ("w_momentum_tsi", self.w_momentum_tsi),
            ("w_momentum_macd", self.w_momentum_macd),
            ("w_momentum_er", self.w_momentum_er),
            ("w_momentum_streak", self.w_momentum_streak),
            ("w_pos_vol_proxy", self.w_pos_vol_proxy),
            ("min_quality", self.min_quality),
            ("congestion_threshold", self.congestion_threshold),
            ("regime_congestion_low", self.regime_congestion_low),
            ("regime_congestion_high", self.regime_congestion_high),
            ("runner_k1", self.runner_k1),
            ("runner_k2", self.runner_k2),
            ("min_runner_momentum", self.min_runner_momentum),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::WeightOutOfRange { name, value });
            }
        }

        if self.regime_congestion_low > self.regime_congestion_high {
            return Err(ConfigError::InvertedRange {
                low_name: "regime_congestion_low",
                low: self.regime_congestion_low,
                high_name: "regime_congestion_high",
                high: self.regime_congestion_high,
            });
        }

        if self.macd_fast >= self.macd_slow {
            return Err(ConfigError::InvertedRange {
                low_name: "macd_fast",
                low: self.macd_fast as f64,
                high_name: "macd_slow",
                high: self.macd_slow as f64,
            });
        }

        if self.anchor_hour > 23 {
            return Err(ConfigError::OutOfRange {
                name: "anchor_hour",
                value: self.anchor_hour as f64,
                min: 0.0,
                max: 23.0,
            });
        }
        if self.anchor_minute > 59 {
            return Err(ConfigError::OutOfRange {
                name: "anchor_minute",
                value: self.anchor_minute as f64,
                min: 0.0,
                max: 59.0,
            });
        }
        if !self.session_window_mins.is_finite()
            || !(1.0..=1440.0).contains(&self.session_window_mins)
        {
            return Err(ConfigError::OutOfRange {
                name: "session_window_mins",
                value: self.session_window_mins,
                min: 1.0,
                max: 1440.0,
            });
        }
        for (name, value) in [
            ("session_pre_scale", self.session_pre_scale),
            ("session_post_scale", self.session_post_scale),
        ] {
            if !value.is_finite() || !(0.0..=10.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    min: 0.0,
                    max: 10.0,
                });
            }
        }

        for (name, value) in [
            ("fav_momentum_amplifier", self.fav_momentum_amplifier),
            ("min_runway_r", self.min_runway_r),
            ("pos_vol_volume_scale", self.pos_vol_volume_scale),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    min: 0.0,
                    max: f64::INFINITY,
                });
            }
        }

        if self.runner_r_min < 0.0
            || !self.runner_r_min.is_finite()
            || !self.runner_r_max.is_finite()
        {
            return Err(ConfigError::NotFinite {
                name: "runner_r_min/runner_r_max",
                value: self.runner_r_min,
            });
        }
        if self.runner_r_min > self.runner_r_max {
            return Err(ConfigError::InvertedRange {
                low_name: "runner_r_min",
                low: self.runner_r_min,
                high_name: "runner_r_max",
                high: self.runner_r_max,
            });
        }

        Ok(())
    }

    /// Largest lookback any component needs; the engine warms up this many
    /// bars before arming entries.
    pub fn warmup_bars(&self) -> usize {
        [
            self.pos_vol_rb_window,
            self.momentum_roc_lookback + 1,
            self.momentum_z_lookback.min(64),
            self.macd_slow + self.macd_signal,
            self.er_lookback + 1,
            self.streak_window,
            self.congestion_lookback,
        ]
        .into_iter()
        .max()
        .unwrap_or(1)
    }
}
