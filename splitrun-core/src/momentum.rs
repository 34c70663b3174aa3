//! Momentum core — five streaming sub-signals fused by configured weights,
//! plus the Fav/True momentum families.
//!
//! Every sub-signal lands in [0, 1] oriented long (1 favors a long entry);
//! the short orientation is the complement. Disabling the feature
//! short-circuits to the neutral pair without touching sub-signal state,
//! so a disabled run is bit-for-bit deterministic.

use crate::config::EngineConfig;
use crate::domain::{BarHistory, NodeValue, TradeSide};
use crate::math::{blend, clamp_unit, squash_z, Ema, RollingStats};

const Z_DIVISOR: f64 = 2.0;
const DENOM_FLOOR: f64 = 1e-9;

/// ADX reading that maps to full confidence.
const ADX_FULL_SCALE: f64 = 50.0;

/// Long-oriented sub-signal values for one bar.
#[derive(Debug, Clone, Copy)]
pub struct MomentumOutputs {
    pub roc: f64,
    pub tsi: f64,
    pub macd: f64,
    pub efficiency: f64,
    pub streak: f64,
    /// Weighted composite, long-oriented.
    pub core: f64,
    /// Trend-strength confidence from ADX.
    pub confidence: f64,
}

impl MomentumOutputs {
    /// Neutral outputs produced when the momentum core is disabled.
    pub fn neutral() -> Self {
        Self {
            roc: 0.5,
            tsi: 0.5,
            macd: 0.5,
            efficiency: 0.5,
            streak: 0.5,
            core: 0.5,
            confidence: 0.8,
        }
    }

    /// Composite oriented for the requested side.
    pub fn core_for(&self, side: TradeSide) -> f64 {
        match side {
            TradeSide::Long => self.core,
            TradeSide::Short => 1.0 - self.core,
        }
    }

    pub fn node_for(&self, side: TradeSide) -> NodeValue {
        NodeValue::new(self.core_for(side), self.confidence)
    }
}

/// Streaming momentum state: rolling z windows and EMA chains.
#[derive(Debug, Clone)]
pub struct MomentumCore {
    roc_lookback: usize,
    er_lookback: usize,
    streak_window: usize,
    weights: [f64; 5],

    roc_stats: RollingStats,
    er_stats: RollingStats,
    streak_stats: RollingStats,
    tsi_num: Ema,
    tsi_den: Ema,
    macd_fast: Ema,
    macd_slow: Ema,
    macd_signal: Ema,
}

impl MomentumCore {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            roc_lookback: config.momentum_roc_lookback,
            er_lookback: config.er_lookback.max(2),
            streak_window: config.streak_window,
            weights: [
                config.w_momentum_roc,
                config.w_momentum_tsi,
                config.w_momentum_macd,
                config.w_momentum_er,
                config.w_momentum_streak,
            ],
            roc_stats: RollingStats::new(config.momentum_z_lookback),
            er_stats: RollingStats::new(config.momentum_z_lookback),
            streak_stats: RollingStats::new(config.momentum_z_lookback),
            tsi_num: Ema::new(config.tsi_period),
            tsi_den: Ema::new(config.tsi_period),
            macd_fast: Ema::new(config.macd_fast),
            macd_slow: Ema::new(config.macd_slow),
            macd_signal: Ema::new(config.macd_signal),
        }
    }

    /// Sum of the configured sub-signal weights.
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Advance all sub-signal state by one bar and return the fused
    /// outputs. `atr` and `adx` come from the indicator collaborator,
    /// already defaulted by the caller when uninitialized.
    pub fn update(&mut self, history: &BarHistory, atr: f64, adx: f64) -> MomentumOutputs {
        let Some(current) = history.ago(0) else {
            return MomentumOutputs::neutral();
        };
        let close = current.close;
        let atr_floor = atr.max(DENOM_FLOOR);

        // 1. Rate of change, ATR-normalized, z-scored.
        let roc_raw = (close - history.close_ago_or_current(self.roc_lookback)) / atr_floor;
        let roc = squash_z(self.roc_stats.update(roc_raw), Z_DIVISOR);

        // 2. TSI-like oscillator: smoothed delta over smoothed |delta|.
        let delta = close - history.close_ago_or_current(1);
        let num = self.tsi_num.update(delta);
        let den = self.tsi_den.update(delta.abs()).max(DENOM_FLOOR);
        let tsi = clamp_unit(0.5 * (num / den + 1.0));

        // 3. MACD histogram normalized by 1.5 * ATR.
        let fast = self.macd_fast.update(close);
        let slow = self.macd_slow.update(close);
        let macd_line = fast - slow;
        let signal = self.macd_signal.update(macd_line);
        let macd = squash_z((macd_line - signal) / (1.5 * atr_floor), Z_DIVISOR);

        // 4. Efficiency ratio: net travel over path length.
        let net = (close - history.close_ago_or_current(self.er_lookback)).abs();
        let mut path = 0.0;
        for i in 1..=self.er_lookback {
            if history.ago(i).is_none() {
                break;
            }
            path += (history.close_ago_or_current(i - 1) - history.close_ago_or_current(i)).abs();
        }
        let er_raw = net / path.max(DENOM_FLOOR);
        let efficiency = squash_z(self.er_stats.update(er_raw), Z_DIVISOR);

        // 5. Directional streak: signed body-ratio sum over a short window.
        let mut streak_sum = 0.0;
        for i in 0..self.streak_window.min(history.len()) {
            let bar = history.ago(i).expect("span bounded by len");
            streak_sum += bar.direction() * bar.body_ratio();
        }
        let streak = squash_z(self.streak_stats.update(streak_sum), Z_DIVISOR);

        // Composite: weighted average, zero-weight terms excluded.
        let values = [roc, tsi, macd, efficiency, streak];
        let mut num_w = 0.0;
        let mut den_w = 0.0;
        for (w, v) in self.weights.iter().zip(values) {
            num_w += w * v;
            den_w += w;
        }
        let core = if den_w > 0.0 {
            clamp_unit(num_w / den_w)
        } else {
            0.5
        };

        let confidence = clamp_unit(adx / ADX_FULL_SCALE);

        MomentumOutputs {
            roc,
            tsi,
            macd,
            efficiency,
            streak,
            core,
            confidence,
        }
    }
}

/// Fav/True momentum families.
///
/// Favored momentum amplifies the base by the directional-volume bias;
/// true momentum blends base toward the favored value according to how
/// strong the space/trend context is. Weak context anchors at the base.
pub fn momentum_families(
    base: f64,
    pos_vol_proxy: f64,
    q_space: f64,
    q_trend: f64,
    amplifier: f64,
) -> (f64, f64) {
    let fav = if amplifier != 0.0 {
        clamp_unit(base * (1.0 + amplifier * (pos_vol_proxy - 0.5)))
    } else {
        base
    };
    let context = clamp_unit(0.5 * q_space + 0.5 * q_trend);
    let true_momentum = clamp_unit(blend(base, fav, context));
    (fav, true_momentum)
}
