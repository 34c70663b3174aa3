//! Runner split sizing: divide the entry quantity into a core leg and a
//! runner leg and derive each leg's bracket levels from one shared risk
//! unit.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::{Instrument, TradeSide};
use crate::math::clamp_unit;

/// Hard cap on the context nudge around the base fraction.
const NUDGE_CAP: f64 = 0.2;

/// Base share of the position assigned to the runner leg.
const BASE_FRACTION: f64 = 0.5;

/// One planned entry, both legs priced.
///
/// The runner fields are meaningful only when `runner_qty > 0`; a plan
/// with no runner leg carries the whole quantity on the core bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannedTrade {
    pub side: TradeSide,
    pub entry: f64,
    /// Risk unit (1R) in price points.
    pub risk: f64,
    pub core_qty: u32,
    pub runner_qty: u32,
    pub core_stop: f64,
    pub core_target: f64,
    pub runner_stop: f64,
    pub runner_target: f64,
}

impl PlannedTrade {
    pub fn total_qty(&self) -> u32 {
        self.core_qty + self.runner_qty
    }

    pub fn has_runner(&self) -> bool {
        self.runner_qty > 0
    }
}

/// Runner share of the total quantity, nudged by context.
///
/// Tailwind above neutral grows the runner; headwind above neutral
/// shrinks it. The nudge is capped at ±0.2 before the final clamp.
pub fn runner_fraction(config: &EngineConfig, tailwind: f64, headwind: f64) -> f64 {
    if !config.apply_runner_management || config.base_contracts < 2 {
        return 0.0;
    }
    let nudge = (config.runner_k1 * (tailwind - 0.5) - config.runner_k2 * (headwind - 0.5))
        .clamp(-NUDGE_CAP, NUDGE_CAP);
    clamp_unit(BASE_FRACTION + nudge)
}

/// A runner leg is allowed only with enough structural runway and enough
/// momentum, unless the force override is set.
pub fn runner_eligible(config: &EngineConfig, runway_r: f64, momentum_core: f64) -> bool {
    config.force_runner_eligible
        || (runway_r >= config.min_runway_r && momentum_core >= config.min_runner_momentum)
}

/// Split `total` contracts into (core, runner). The runner gets the floor
/// of its fractional share; the core absorbs the remainder, so the split
/// always conserves the total.
pub fn split_quantities(total: u32, fraction: f64) -> (u32, u32) {
    let runner = ((total as f64 * clamp_unit(fraction)).floor() as u32).min(total);
    (total - runner, runner)
}

/// Price both legs of an entry.
///
/// The shared risk unit is the bar's range floored at `min_risk_ticks`.
/// The core leg brackets the entry at 1R; the runner leg sits behind a
/// breakeven stop and targets the inverse of its fraction in R, clamped
/// to the configured band.
pub fn plan_trade(
    config: &EngineConfig,
    instrument: &Instrument,
    side: TradeSide,
    entry: f64,
    bar_range: f64,
    tailwind: f64,
    headwind: f64,
    runway_r: f64,
    momentum_core: f64,
) -> PlannedTrade {
    let fraction = if runner_eligible(config, runway_r, momentum_core) {
        runner_fraction(config, tailwind, headwind)
    } else {
        0.0
    };
    let (core_qty, runner_qty) = split_quantities(config.base_contracts, fraction);

    let risk_floor = config.min_risk_ticks as f64 * instrument.tick_size;
    let risk = bar_range.max(risk_floor);
    let sign = side.sign() as f64;

    let runner_r = if fraction > 0.0 {
        (1.0 / fraction).clamp(config.runner_r_min, config.runner_r_max)
    } else {
        config.runner_r_min
    };

    PlannedTrade {
        side,
        entry,
        risk,
        core_qty,
        runner_qty,
        core_stop: entry - sign * risk,
        core_target: entry + sign * risk,
        runner_stop: entry,
        runner_target: entry + sign * risk * runner_r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: u32) -> EngineConfig {
        EngineConfig {
            base_contracts: base,
            ..Default::default()
        }
    }

    fn mnq() -> Instrument {
        Instrument {
            symbol: "MNQ".to_string(),
            tick_size: 0.25,
            point_value: 2.0,
        }
    }

    #[test]
    fn single_contract_never_splits() {
        assert_eq!(runner_fraction(&config(1), 0.9, 0.1), 0.0);
    }

    #[test]
    fn disabled_management_never_splits() {
        let cfg = EngineConfig {
            apply_runner_management: false,
            base_contracts: 4,
            ..Default::default()
        };
        assert_eq!(runner_fraction(&cfg, 0.9, 0.1), 0.0);
    }

    #[test]
    fn neutral_context_keeps_the_base_fraction() {
        let f = runner_fraction(&config(4), 0.5, 0.5);
        assert!((f - 0.5).abs() < 1e-12);
    }

    #[test]
    fn nudge_is_capped() {
        // k1 = k2 = 0.5; full tailwind, zero headwind gives a raw nudge of
        // 0.5*0.5 - 0.5*(-0.5) = 0.5, capped at 0.2.
        let f = runner_fraction(&config(4), 1.0, 0.0);
        assert!((f - 0.7).abs() < 1e-12);
        let g = runner_fraction(&config(4), 0.0, 1.0);
        assert!((g - 0.3).abs() < 1e-12);
    }

    #[test]
    fn split_conserves_the_total() {
        for total in 0..20u32 {
            for f in [0.0, 0.3, 0.5, 0.7, 1.0] {
                let (core, runner) = split_quantities(total, f);
                assert_eq!(core + runner, total);
            }
        }
    }

    #[test]
    fn runner_takes_the_floor() {
        assert_eq!(split_quantities(5, 0.5), (3, 2));
        assert_eq!(split_quantities(4, 0.5), (2, 2));
        assert_eq!(split_quantities(3, 0.7), (1, 2));
    }

    #[test]
    fn eligibility_requires_both_thresholds() {
        let cfg = EngineConfig {
            min_runway_r: 1.0,
            min_runner_momentum: 0.6,
            ..Default::default()
        };
        assert!(runner_eligible(&cfg, 1.5, 0.7));
        assert!(!runner_eligible(&cfg, 0.5, 0.7));
        assert!(!runner_eligible(&cfg, 1.5, 0.5));
    }

    #[test]
    fn force_override_bypasses_thresholds() {
        let cfg = EngineConfig {
            min_runway_r: 1.0,
            min_runner_momentum: 0.9,
            force_runner_eligible: true,
            ..Default::default()
        };
        assert!(runner_eligible(&cfg, 0.0, 0.0));
    }

    #[test]
    fn long_plan_brackets_the_entry() {
        let plan = plan_trade(
            &config(4),
            &mnq(),
            TradeSide::Long,
            18_000.0,
            10.0,
            0.5,
            0.5,
            2.0,
            0.8,
        );
        assert_eq!(plan.risk, 10.0);
        assert_eq!(plan.core_stop, 17_990.0);
        assert_eq!(plan.core_target, 18_010.0);
        assert_eq!(plan.runner_stop, 18_000.0);
        // fraction 0.5 inverts to 2R.
        assert_eq!(plan.runner_target, 18_020.0);
        assert_eq!(plan.total_qty(), 4);
        assert!(plan.has_runner());
    }

    #[test]
    fn short_plan_mirrors_the_levels() {
        let plan = plan_trade(
            &config(4),
            &mnq(),
            TradeSide::Short,
            18_000.0,
            10.0,
            0.5,
            0.5,
            2.0,
            0.8,
        );
        assert_eq!(plan.core_stop, 18_010.0);
        assert_eq!(plan.core_target, 17_990.0);
        assert_eq!(plan.runner_target, 17_980.0);
    }

    #[test]
    fn degenerate_bar_uses_the_tick_floor() {
        // min_risk_ticks = 4, tick 0.25 → 1.0 point floor.
        let plan = plan_trade(
            &config(2),
            &mnq(),
            TradeSide::Long,
            18_000.0,
            0.0,
            0.5,
            0.5,
            2.0,
            0.8,
        );
        assert_eq!(plan.risk, 1.0);
    }

    #[test]
    fn runner_target_multiple_is_clamped() {
        // A tiny fraction would invert far past the band; the plan clamps
        // at r_max.
        let cfg = EngineConfig {
            base_contracts: 10,
            runner_k1: 0.0,
            runner_k2: 0.0,
            ..Default::default()
        };
        let plan = plan_trade(&cfg, &mnq(), TradeSide::Long, 100.0, 2.0, 0.5, 0.5, 2.0, 0.8);
        // fraction 0.5 → 2R, inside [1.5, 6.0].
        assert_eq!(plan.runner_target, 104.0);
        assert!(plan.runner_target <= 100.0 + plan.risk * cfg.runner_r_max);
    }

    #[test]
    fn ineligible_runner_collapses_to_core_only() {
        let cfg = EngineConfig {
            base_contracts: 4,
            min_runner_momentum: 0.9,
            ..Default::default()
        };
        let plan = plan_trade(&cfg, &mnq(), TradeSide::Long, 100.0, 2.0, 0.5, 0.5, 2.0, 0.2);
        assert_eq!(plan.runner_qty, 0);
        assert_eq!(plan.core_qty, 4);
    }
}
