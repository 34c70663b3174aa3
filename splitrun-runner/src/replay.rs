//! Bar replay with a simulated bracket broker.
//!
//! `replay()` drives a fresh engine over a bar series. When the engine
//! plans an entry, the broker fills it at the plan price on the same bar,
//! then works each leg's bracket against later bars: a bar that crosses a
//! leg's stop fills the stop, otherwise a bar that crosses the target
//! fills the target. A bar crossing both fills the stop, the
//! conservative reading of an ambiguous bar.

use anyhow::Result;
use splitrun_core::domain::{Bar, FillEvent, QualitySnapshot, TradeSide};
use splitrun_core::engine::{Engine, EntrySignal, IndicatorSample};
use splitrun_core::sink::{MemorySink, TradeLeg};
use splitrun_core::sizing::PlannedTrade;

use crate::config_file::RunConfig;

/// Everything a replay produced.
pub struct ReplayReport {
    pub snapshots: Vec<QualitySnapshot>,
    pub sink: MemorySink,
}

#[derive(Debug, Clone, Copy)]
struct WorkingLeg {
    leg: TradeLeg,
    quantity: u32,
    stop: f64,
    target: f64,
}

#[derive(Debug, Default)]
struct SimBroker {
    side: Option<TradeSide>,
    legs: Vec<WorkingLeg>,
}

impl SimBroker {
    fn arm(&mut self, plan: &PlannedTrade) {
        self.side = Some(plan.side);
        self.legs.clear();
        if plan.core_qty > 0 {
            self.legs.push(WorkingLeg {
                leg: TradeLeg::Core,
                quantity: plan.core_qty,
                stop: plan.core_stop,
                target: plan.core_target,
            });
        }
        if plan.runner_qty > 0 {
            self.legs.push(WorkingLeg {
                leg: TradeLeg::Runner,
                quantity: plan.runner_qty,
                stop: plan.runner_stop,
                target: plan.runner_target,
            });
        }
    }

    /// Fills triggered by this bar, stop checked before target per leg.
    fn check(&mut self, bar: &Bar) -> Vec<FillEvent> {
        let Some(side) = self.side else {
            return Vec::new();
        };
        let exit_side = side.opposite();
        let mut fills = Vec::new();

        self.legs.retain(|leg| {
            let (stop_hit, target_hit) = match side {
                TradeSide::Long => (bar.low <= leg.stop, bar.high >= leg.target),
                TradeSide::Short => (bar.high >= leg.stop, bar.low <= leg.target),
            };
            let (price, kind) = if stop_hit {
                (leg.stop, "Stop")
            } else if target_hit {
                (leg.target, "Target")
            } else {
                return true;
            };
            fills.push(FillEvent {
                timestamp: bar.timestamp,
                price,
                quantity: leg.quantity,
                side: exit_side,
                order_label: format!("{} {kind}", leg.leg.order_label()),
            });
            false
        });

        if self.legs.is_empty() {
            self.side = None;
        }
        fills
    }
}

/// Replay a bar series through a fresh engine.
///
/// `signal_at` supplies the per-bar entry trigger the host would normally
/// derive from its own pattern recognition.
pub fn replay<F>(config: &RunConfig, bars: &[Bar], signal_at: F) -> Result<ReplayReport>
where
    F: Fn(usize, &Bar) -> Option<EntrySignal>,
{
    config.validate()?;
    let mut engine = Engine::new(
        config.engine.clone(),
        config.instrument.clone(),
        MemorySink::default(),
    )?;
    let mut broker = SimBroker::default();
    let mut snapshots = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        // Exits from previously armed brackets resolve against this bar
        // before the engine sees any new entry decision's fills.
        for fill in broker.check(bar) {
            engine.on_fill(&fill);
        }

        let signal = signal_at(i, bar);
        let outcome = engine.on_bar(bar.clone(), &IndicatorSample::default(), None, signal);
        snapshots.push(outcome.snapshot.clone());

        if let Some(plan) = outcome.plan {
            // Market entry at the plan price, one fill for the whole size.
            engine.on_fill(&FillEvent {
                timestamp: bar.timestamp,
                price: plan.entry,
                quantity: plan.total_qty(),
                side: plan.side,
                order_label: "ENTRY".to_string(),
            });
            broker.arm(&plan);
        }
    }

    Ok(ReplayReport {
        snapshots,
        sink: engine.into_sink(),
    })
}
