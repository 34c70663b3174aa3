//! The per-bar decision engine.
//!
//! One `Engine` owns all per-run state: bar history, streaming signal
//! components, the hysteresis machines, and the fill lifecycle tracker.
//! The host drives it with `on_bar` and `on_fill`, strictly serialized:
//! the engine is single-threaded and never re-entered.

use crate::config::{ConfigError, EngineConfig};
use crate::domain::{Bar, BarHistory, CompletedTrade, FillEvent, Instrument, QualitySnapshot, TradeSide};
use crate::lifecycle::{EntryContext, LifecycleTracker};
use crate::math::{clamp_unit, Ema};
use crate::momentum::{momentum_families, MomentumCore, MomentumOutputs};
use crate::nodes::{PosVolGraph, PosVolOutputs};
use crate::quality::{gate_permits, total_new, total_old, QualityInputs};
use crate::regime::{congestion_fraction, Regime, RegimeClassifier, TrailMode, TrailSelector, VolState};
use crate::session::SessionWeight;
use crate::sink::{RecordSink, SetupEvent, SetupStatus, TradeIntent, TradeLeg};
use crate::sizing::{plan_trade, PlannedTrade};

/// ATR baseline smoothing period for the volatility state.
const ATR_BASELINE_PERIOD: usize = 50;
const VOL_HIGH_RATIO: f64 = 1.1;
const VOL_LOW_RATIO: f64 = 0.9;

/// ADX assumed when the collaborator has no reading yet; maps to the
/// neutral 0.8 confidence.
const DEFAULT_ADX: f64 = 40.0;

const HISTORY_CAPACITY_MIN: usize = 256;

/// Engine lifecycle phase. Entries arm only in `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configure,
    WarmUp,
    Ready,
}

/// Optional per-bar indicator readings from the host's collaborators.
/// Absent values fall back to neutral defaults, never an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorSample {
    pub atr: Option<f64>,
    pub adx: Option<f64>,
    pub rsi: Option<f64>,
    /// Room to the next structural level, in R units.
    pub structural_runway_r: Option<f64>,
}

/// External entry trigger for this bar. Pattern recognition lives in the
/// host; the engine only decides whether to act on it.
#[derive(Debug, Clone, Copy)]
pub struct EntrySignal {
    pub side: TradeSide,
}

/// Everything the engine decided on one bar.
#[derive(Debug, Clone)]
pub struct BarOutcome {
    pub phase: Phase,
    pub regime: Regime,
    pub trail_mode: TrailMode,
    pub congestion: f64,
    pub snapshot: QualitySnapshot,
    pub plan: Option<PlannedTrade>,
}

pub struct Engine<S: RecordSink> {
    config: EngineConfig,
    instrument: Instrument,
    phase: Phase,
    bars_seen: usize,

    history: BarHistory,
    session: SessionWeight,
    graph: PosVolGraph,
    momentum: MomentumCore,
    trail: TrailSelector,
    classifier: RegimeClassifier,
    atr_baseline: Ema,

    lifecycle: LifecycleTracker,
    last_snapshot: QualitySnapshot,
    sink: S,
}

impl<S: RecordSink> Engine<S> {
    /// Validate the configuration and build a warmed-down engine. The
    /// brief `Configure` phase covers validation; a successful return is
    /// already in `WarmUp`.
    pub fn new(config: EngineConfig, instrument: Instrument, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let capacity = (config.warmup_bars() + 1).max(HISTORY_CAPACITY_MIN);
        let mut engine = Self {
            phase: Phase::Configure,
            bars_seen: 0,
            history: BarHistory::new(capacity),
            session: SessionWeight::from_config(&config),
            graph: PosVolGraph::from_config(&config),
            momentum: MomentumCore::from_config(&config),
            trail: TrailSelector::new(config.trail_debounce_bars, config.trail_cooldown_bars),
            classifier: RegimeClassifier::new(
                config.regime_hold_bars,
                config.regime_switch_interval,
                config.regime_congestion_low,
                config.regime_congestion_high,
            ),
            atr_baseline: Ema::new(ATR_BASELINE_PERIOD),
            lifecycle: LifecycleTracker::new(instrument.clone(), config.timeout_order_label.clone()),
            last_snapshot: QualitySnapshot::neutral(),
            instrument,
            config,
            sink,
        };
        engine.phase = Phase::WarmUp;
        Ok(engine)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_flat(&self) -> bool {
        self.lifecycle.is_flat()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run the full pipeline for one closed bar.
    pub fn on_bar(
        &mut self,
        bar: Bar,
        indicators: &IndicatorSample,
        ltf_bars: Option<&[Bar]>,
        signal: Option<EntrySignal>,
    ) -> BarOutcome {
        if !bar.is_sane() {
            // Malformed bars never advance any state.
            return self.outcome(None);
        }

        let timestamp = bar.timestamp;
        let close = bar.close;
        let bar_range = bar.range();
        self.history.push(bar);
        self.bars_seen += 1;
        if self.phase == Phase::WarmUp && self.bars_seen >= self.config.warmup_bars() {
            self.phase = Phase::Ready;
        }

        let session_weight = self.session.weight(timestamp);

        let atr = indicators
            .atr
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or_else(|| bar_range.max(self.instrument.tick_size));
        let adx = indicators.adx.filter(|v| v.is_finite()).unwrap_or(DEFAULT_ADX);
        let inputs = QualityInputs::from_indicators(indicators.adx, indicators.rsi);

        let pos_vol = if self.config.use_pos_vol_nodes {
            self.graph.evaluate(&self.history, ltf_bars)
        } else {
            PosVolOutputs::neutral()
        };
        // Session modulation: lean the proxy toward its session-weighted
        // reading by the configured blend.
        let blend_w = self.config.pos_vol_session_blend;
        let proxy = (1.0 - blend_w) * pos_vol.proxy.value
            + blend_w * pos_vol.proxy.value * session_weight;
        let proxy = clamp_unit(proxy);

        let momentum = if self.config.use_momentum_core {
            self.momentum.update(&self.history, atr, adx)
        } else {
            MomentumOutputs::neutral()
        };
        let family_base = if self.config.use_momentum_core && self.momentum.total_weight() > 0.0 {
            momentum.core
        } else {
            inputs.raw_momentum
        };
        let (fav_momentum, true_momentum) = momentum_families(
            family_base,
            proxy,
            inputs.space,
            inputs.trend,
            self.config.fav_momentum_amplifier,
        );

        let t_old = total_old(&inputs);
        let t_new = total_new(&inputs, proxy, self.config.w_pos_vol_proxy);

        self.last_snapshot = QualitySnapshot {
            space: inputs.space,
            trend: inputs.trend,
            structural_res: inputs.structural_res,
            raw_momentum: inputs.raw_momentum,
            pos_vol_proxy: proxy,
            pos_vol_confidence: pos_vol.proxy.confidence,
            momentum_core: momentum.core,
            momentum_confidence: momentum.confidence,
            fav_momentum,
            true_momentum,
            session_weight,
            total_old: t_old,
            total_new: t_new,
        };

        let congestion = congestion_fraction(
            &self.history,
            self.config.congestion_lookback,
            self.instrument.tick_size,
        );
        self.trail.update(congestion, self.config.congestion_threshold);

        let baseline = self.atr_baseline.update(atr);
        let ratio = atr / baseline.max(f64::MIN_POSITIVE);
        let vol = if ratio > VOL_HIGH_RATIO {
            VolState::High
        } else if ratio < VOL_LOW_RATIO {
            VolState::Low
        } else {
            VolState::Normal
        };
        self.classifier.update(vol, congestion);

        let plan = if self.phase == Phase::Ready && self.lifecycle.is_flat() {
            signal.and_then(|signal| {
                self.try_entry(signal, timestamp, close, bar_range, congestion, indicators)
            })
        } else {
            None
        };

        self.outcome(plan)
    }

    /// Forward one broker fill; a flattening fill yields the completed
    /// trade, already reported to the sink.
    pub fn on_fill(&mut self, fill: &FillEvent) -> Option<CompletedTrade> {
        let completed = self.lifecycle.on_fill(fill)?;
        self.sink.trade_completed(&completed);
        Some(completed)
    }

    fn try_entry(
        &mut self,
        signal: EntrySignal,
        timestamp: chrono::DateTime<chrono::Utc>,
        close: f64,
        bar_range: f64,
        congestion: f64,
        indicators: &IndicatorSample,
    ) -> Option<PlannedTrade> {
        let snapshot = &self.last_snapshot;
        if !gate_permits(
            self.config.use_quality_gate,
            snapshot.total_new,
            self.config.min_quality,
        ) {
            self.sink.setup_event(&SetupEvent {
                timestamp,
                status: SetupStatus::Skipped,
                side: signal.side,
                reason: "quality below minimum".to_string(),
                price: close,
                total_new: snapshot.total_new,
                session_weight: snapshot.session_weight,
                regime: self.classifier.regime(),
            });
            return None;
        }

        // Context for the split: momentum in the trade direction pushes
        // the runner bigger, congestion pushes it smaller.
        let tailwind = match signal.side {
            TradeSide::Long => snapshot.true_momentum,
            TradeSide::Short => 1.0 - snapshot.true_momentum,
        };
        let momentum_oriented = match signal.side {
            TradeSide::Long => snapshot.momentum_core,
            TradeSide::Short => 1.0 - snapshot.momentum_core,
        };
        let runway = indicators.structural_runway_r.unwrap_or(f64::MAX);

        let plan = plan_trade(
            &self.config,
            &self.instrument,
            signal.side,
            close,
            bar_range,
            tailwind,
            congestion,
            runway,
            momentum_oriented,
        );

        self.sink.setup_event(&SetupEvent {
            timestamp,
            status: SetupStatus::Triggered,
            side: signal.side,
            reason: "entry signal".to_string(),
            price: close,
            total_new: snapshot.total_new,
            session_weight: snapshot.session_weight,
            regime: self.classifier.regime(),
        });
        if plan.core_qty > 0 {
            self.sink.trade_intent(&TradeIntent {
                timestamp,
                leg: TradeLeg::Core,
                side: plan.side,
                quantity: plan.core_qty,
                entry: plan.entry,
                stop: plan.core_stop,
                target: plan.core_target,
            });
        }
        if plan.runner_qty > 0 {
            self.sink.trade_intent(&TradeIntent {
                timestamp,
                leg: TradeLeg::Runner,
                side: plan.side,
                quantity: plan.runner_qty,
                entry: plan.entry,
                stop: plan.runner_stop,
                target: plan.runner_target,
            });
        }

        self.lifecycle.stage_entry(EntryContext {
            plan,
            snapshot: snapshot.clone(),
            regime: self.classifier.regime(),
        });
        Some(plan)
    }

    fn outcome(&self, plan: Option<PlannedTrade>) -> BarOutcome {
        BarOutcome {
            phase: self.phase,
            regime: self.classifier.regime(),
            trail_mode: self.trail.mode(),
            congestion: congestion_fraction(
                &self.history,
                self.config.congestion_lookback,
                self.instrument.tick_size,
            ),
            snapshot: self.last_snapshot.clone(),
            plan,
        }
    }
}
