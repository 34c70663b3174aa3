//! Fill reconciliation: duplicate suppression, signed position tracking,
//! and exit classification into one `CompletedTrade` per round-trip.

use chrono::{DateTime, Utc};

use crate::domain::{CompletedTrade, ExitReason, FillEvent, Instrument, QualitySnapshot, TradeSide};
use crate::regime::Regime;
use crate::sizing::PlannedTrade;

/// Entry context staged by the engine when it submits an entry, consumed
/// by the first opening fill.
#[derive(Debug, Clone)]
pub struct EntryContext {
    pub plan: PlannedTrade,
    pub snapshot: QualitySnapshot,
    pub regime: Regime,
}

#[derive(Debug, Clone)]
struct FillKey {
    timestamp: DateTime<Utc>,
    price: f64,
    quantity: u32,
}

#[derive(Debug, Clone)]
struct OpenPosition {
    side: TradeSide,
    entry_time: DateTime<Utc>,
    /// Quantity-weighted entry price accumulator (price * qty).
    entry_points: f64,
    entry_qty: u32,
    /// Realized P&L in price points, quantity-weighted.
    realized_points: f64,
    plan: PlannedTrade,
    snapshot: QualitySnapshot,
    regime: Regime,
}

impl OpenPosition {
    fn avg_entry(&self) -> f64 {
        if self.entry_qty == 0 {
            0.0
        } else {
            self.entry_points / self.entry_qty as f64
        }
    }
}

/// Broker-facing position tracker.
///
/// Fills arrive serially; the tracker suppresses duplicate callbacks,
/// tracks the signed open quantity, and emits exactly one trade record
/// when the position returns to flat.
#[derive(Debug)]
pub struct LifecycleTracker {
    instrument: Instrument,
    timeout_label: String,
    last_fill: Option<FillKey>,
    pending_entry: Option<EntryContext>,
    open: Option<OpenPosition>,
    position: i64,
}

impl LifecycleTracker {
    pub fn new(instrument: Instrument, timeout_label: String) -> Self {
        Self {
            instrument,
            timeout_label,
            last_fill: None,
            pending_entry: None,
            open: None,
            position: 0,
        }
    }

    /// Signed open quantity (positive long, negative short).
    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn is_flat(&self) -> bool {
        self.position == 0
    }

    /// Stage the context the next opening fill will be stamped with.
    pub fn stage_entry(&mut self, context: EntryContext) {
        self.pending_entry = Some(context);
    }

    /// Process one broker fill. Returns a completed trade when this fill
    /// flattened the position.
    pub fn on_fill(&mut self, fill: &FillEvent) -> Option<CompletedTrade> {
        if self.is_duplicate(fill) {
            return None;
        }
        self.last_fill = Some(FillKey {
            timestamp: fill.timestamp,
            price: fill.price,
            quantity: fill.quantity,
        });

        let was_flat = self.position == 0;
        self.position += fill.quantity as i64 * fill.side.sign() as i64;

        if was_flat && self.position != 0 {
            self.open_position(fill);
            return None;
        }

        let Some(open) = self.open.as_mut() else {
            return None;
        };

        if fill.side == open.side {
            // Scale-in fill on the same side: fold into the entry average.
            open.entry_points += fill.price * fill.quantity as f64;
            open.entry_qty += fill.quantity;
            return None;
        }

        let sign = open.side.sign();
        open.realized_points += (fill.price - open.avg_entry()) * sign * fill.quantity as f64;

        if self.position == 0 {
            return Some(self.close_position(fill));
        }
        None
    }

    /// Duplicate: same timestamp and quantity as the immediately previous
    /// callback, price within half a tick.
    fn is_duplicate(&self, fill: &FillEvent) -> bool {
        let Some(last) = &self.last_fill else {
            return false;
        };
        last.timestamp == fill.timestamp
            && last.quantity == fill.quantity
            && (last.price - fill.price).abs() <= self.instrument.half_tick()
    }

    fn open_position(&mut self, fill: &FillEvent) {
        let context = self.pending_entry.take().unwrap_or(EntryContext {
            plan: PlannedTrade {
                side: fill.side,
                entry: fill.price,
                risk: self.instrument.tick_size,
                core_qty: fill.quantity,
                runner_qty: 0,
                core_stop: fill.price,
                core_target: fill.price,
                runner_stop: fill.price,
                runner_target: fill.price,
            },
            snapshot: QualitySnapshot::neutral(),
            regime: Regime::Default,
        });
        self.open = Some(OpenPosition {
            side: fill.side,
            entry_time: fill.timestamp,
            entry_points: fill.price * fill.quantity as f64,
            entry_qty: fill.quantity,
            realized_points: 0.0,
            plan: context.plan,
            snapshot: context.snapshot,
            regime: context.regime,
        });
    }

    fn close_position(&mut self, fill: &FillEvent) -> CompletedTrade {
        let open = self.open.take().expect("position was open");
        let exit_reason = self.classify_exit(&open, fill);

        let pnl_points = open.realized_points;
        let pnl_ticks = pnl_points / self.instrument.tick_size;
        let pnl_currency = pnl_points * self.instrument.point_value;
        let per_contract = pnl_points / open.entry_qty.max(1) as f64;
        let r_multiple = if open.plan.risk > 0.0 {
            per_contract / open.plan.risk
        } else {
            0.0
        };

        CompletedTrade {
            side: open.side,
            quantity: open.entry_qty,
            entry_time: open.entry_time,
            entry_price: open.avg_entry(),
            exit_time: fill.timestamp,
            exit_price: fill.price,
            planned_stop: open.plan.core_stop,
            planned_target: open.plan.core_target,
            exit_reason,
            pnl_ticks,
            pnl_currency,
            r_multiple,
            entry_snapshot: open.snapshot,
            entry_regime: open.regime,
        }
    }

    /// Label first, price proximity second, `Manual` as the defined
    /// fallback.
    fn classify_exit(&self, open: &OpenPosition, fill: &FillEvent) -> ExitReason {
        let label = fill.order_label.as_str();
        if label.contains("Stop") {
            return ExitReason::Stop;
        }
        if label.contains("Target") || label.contains("TP") {
            return ExitReason::Target;
        }
        if !self.timeout_label.is_empty() && label.contains(self.timeout_label.as_str()) {
            return ExitReason::Timeout;
        }

        let half_tick = self.instrument.half_tick();
        let near = |level: f64| (fill.price - level).abs() <= half_tick;
        if near(open.plan.core_target) || near(open.plan.runner_target) {
            ExitReason::Target
        } else if near(open.plan.core_stop) {
            ExitReason::Stop
        } else if near(open.avg_entry()) {
            ExitReason::Breakeven
        } else {
            ExitReason::Manual
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn mnq() -> Instrument {
        Instrument {
            symbol: "MNQ".to_string(),
            tick_size: 0.25,
            point_value: 2.0,
        }
    }

    fn ts(min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, min, sec).unwrap()
    }

    fn fill(min: u32, sec: u32, price: f64, qty: u32, side: TradeSide, label: &str) -> FillEvent {
        FillEvent {
            timestamp: ts(min, sec),
            price,
            quantity: qty,
            side,
            order_label: label.to_string(),
        }
    }

    fn plan_at(entry: f64, side: TradeSide) -> PlannedTrade {
        let sign = side.sign();
        PlannedTrade {
            side,
            entry,
            risk: 10.0,
            core_qty: 1,
            runner_qty: 1,
            core_stop: entry - sign * 10.0,
            core_target: entry + sign * 10.0,
            runner_stop: entry,
            runner_target: entry + sign * 20.0,
        }
    }

    fn tracker_with_plan(entry: f64, side: TradeSide) -> LifecycleTracker {
        let mut t = LifecycleTracker::new(mnq(), "Timeout".to_string());
        t.stage_entry(EntryContext {
            plan: plan_at(entry, side),
            snapshot: QualitySnapshot::neutral(),
            regime: Regime::TrendRoomy,
        });
        t
    }

    #[test]
    fn duplicate_fill_is_ignored() {
        let mut t = tracker_with_plan(18_000.0, TradeSide::Long);
        assert!(t.on_fill(&fill(30, 0, 18_000.0, 2, TradeSide::Long, "CORE")).is_none());
        assert_eq!(t.position(), 2);
        // Same timestamp and quantity, price one-eighth of a tick off.
        assert!(t
            .on_fill(&fill(30, 0, 18_000.03, 2, TradeSide::Long, "CORE"))
            .is_none());
        assert_eq!(t.position(), 2);
    }

    #[test]
    fn same_prices_at_different_timestamps_both_count() {
        let mut t = tracker_with_plan(18_000.0, TradeSide::Long);
        t.on_fill(&fill(30, 0, 18_000.0, 1, TradeSide::Long, "CORE"));
        t.on_fill(&fill(30, 5, 18_000.0, 1, TradeSide::Long, "RUNNER"));
        assert_eq!(t.position(), 2);
    }

    #[test]
    fn long_round_trip_at_target() {
        let mut t = tracker_with_plan(18_000.0, TradeSide::Long);
        t.on_fill(&fill(30, 0, 18_000.0, 2, TradeSide::Long, "CORE"));
        let trade = t
            .on_fill(&fill(45, 0, 18_010.0, 2, TradeSide::Short, "CORE Target"))
            .unwrap();
        assert_eq!(trade.exit_reason, ExitReason::Target);
        assert_eq!(trade.quantity, 2);
        // 10 points * 2 contracts = 20 points = 80 ticks = $40.
        assert!((trade.pnl_ticks - 80.0).abs() < 1e-9);
        assert!((trade.pnl_currency - 40.0).abs() < 1e-9);
        assert!((trade.r_multiple - 1.0).abs() < 1e-9);
        assert!(t.is_flat());
    }

    #[test]
    fn short_round_trip_at_stop() {
        let mut t = tracker_with_plan(18_000.0, TradeSide::Short);
        t.on_fill(&fill(30, 0, 18_000.0, 1, TradeSide::Short, "CORE"));
        assert_eq!(t.position(), -1);
        let trade = t
            .on_fill(&fill(32, 0, 18_010.0, 1, TradeSide::Long, "CORE Stop"))
            .unwrap();
        assert_eq!(trade.exit_reason, ExitReason::Stop);
        assert!(trade.pnl_currency < 0.0);
        assert!((trade.r_multiple + 1.0).abs() < 1e-9);
    }

    #[test]
    fn label_beats_price_proximity() {
        let mut t = tracker_with_plan(18_000.0, TradeSide::Long);
        t.on_fill(&fill(30, 0, 18_000.0, 1, TradeSide::Long, "CORE"));
        // Price sits exactly on the target, but the label says stop.
        let trade = t
            .on_fill(&fill(40, 0, 18_010.0, 1, TradeSide::Short, "RUNNER Stop"))
            .unwrap();
        assert_eq!(trade.exit_reason, ExitReason::Stop);
    }

    #[test]
    fn timeout_label_classifies_timeout() {
        let mut t = tracker_with_plan(18_000.0, TradeSide::Long);
        t.on_fill(&fill(30, 0, 18_000.0, 1, TradeSide::Long, "CORE"));
        let trade = t
            .on_fill(&fill(50, 0, 18_003.0, 1, TradeSide::Short, "Timeout"))
            .unwrap();
        assert_eq!(trade.exit_reason, ExitReason::Timeout);
    }

    #[test]
    fn unlabeled_exit_near_entry_is_breakeven() {
        let mut t = tracker_with_plan(18_000.0, TradeSide::Long);
        t.on_fill(&fill(30, 0, 18_000.0, 1, TradeSide::Long, "CORE"));
        let trade = t
            .on_fill(&fill(50, 0, 18_000.0, 1, TradeSide::Short, "exit"))
            .unwrap();
        assert_eq!(trade.exit_reason, ExitReason::Breakeven);
    }

    #[test]
    fn unlabeled_exit_away_from_all_levels_is_manual() {
        let mut t = tracker_with_plan(18_000.0, TradeSide::Long);
        t.on_fill(&fill(30, 0, 18_000.0, 1, TradeSide::Long, "CORE"));
        let trade = t
            .on_fill(&fill(50, 0, 18_004.5, 1, TradeSide::Short, "flatten"))
            .unwrap();
        assert_eq!(trade.exit_reason, ExitReason::Manual);
    }

    #[test]
    fn split_exit_emits_one_trade_with_blended_pnl() {
        let mut t = tracker_with_plan(18_000.0, TradeSide::Long);
        t.on_fill(&fill(30, 0, 18_000.0, 4, TradeSide::Long, "ENTRY"));
        // Core leg out at +10, runner leg out at +20.
        assert!(t
            .on_fill(&fill(40, 0, 18_010.0, 2, TradeSide::Short, "CORE Target"))
            .is_none());
        assert_eq!(t.position(), 2);
        let trade = t
            .on_fill(&fill(55, 0, 18_020.0, 2, TradeSide::Short, "RUNNER Target"))
            .unwrap();
        assert_eq!(trade.quantity, 4);
        // 2*10 + 2*20 = 60 points = $120; per contract 15 points = 1.5R.
        assert!((trade.pnl_currency - 120.0).abs() < 1e-9);
        assert!((trade.r_multiple - 1.5).abs() < 1e-9);
        assert!(t.is_flat());
    }

    #[test]
    fn scale_in_averages_the_entry() {
        let mut t = tracker_with_plan(18_000.0, TradeSide::Long);
        t.on_fill(&fill(30, 0, 18_000.0, 1, TradeSide::Long, "CORE"));
        t.on_fill(&fill(31, 0, 18_002.0, 1, TradeSide::Long, "RUNNER"));
        let trade = t
            .on_fill(&fill(40, 0, 18_011.0, 2, TradeSide::Short, "Flatten Target"))
            .unwrap();
        assert!((trade.entry_price - 18_001.0).abs() < 1e-9);
        // (11 + 9) points = 20 points = $40.
        assert!((trade.pnl_currency - 40.0).abs() < 1e-9);
    }
}
