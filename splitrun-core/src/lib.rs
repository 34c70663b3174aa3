//! Splitrun Core — the per-bar decision engine for a split-order futures
//! strategy.
//!
//! This crate contains everything that decides, nothing that connects:
//! - Domain types (bars, fills, instruments, snapshots, completed trades)
//! - Numeric primitives (clamp/squash/blend, rolling z-scores, EMAs)
//! - The PosVol node graph and the momentum core
//! - The quality composite and entry gate
//! - Congestion, trail-mode hysteresis, and the regime classifier
//! - Runner split sizing and the fill lifecycle tracker
//! - The bar-driven engine that wires them together
//!
//! Broker connectivity, data feeds, and entry-pattern recognition live in
//! the host; they meet this crate at `EntrySignal`, `IndicatorSample`,
//! `FillEvent`, and `RecordSink`.

pub mod config;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod lifecycle;
pub mod math;
pub mod momentum;
pub mod nodes;
pub mod quality;
pub mod regime;
pub mod session;
pub mod sink;
pub mod sizing;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything that crosses the host boundary is
    /// Send + Sync, so a host may drive the engine from a worker thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::FillEvent>();
        require_sync::<domain::FillEvent>();
        require_send::<domain::Instrument>();
        require_sync::<domain::Instrument>();
        require_send::<domain::QualitySnapshot>();
        require_sync::<domain::QualitySnapshot>();
        require_send::<domain::CompletedTrade>();
        require_sync::<domain::CompletedTrade>();

        require_send::<config::EngineConfig>();
        require_sync::<config::EngineConfig>();
        require_send::<fingerprint::ConfigHash>();
        require_sync::<fingerprint::ConfigHash>();

        require_send::<sizing::PlannedTrade>();
        require_sync::<sizing::PlannedTrade>();
        require_send::<regime::Regime>();
        require_sync::<regime::Regime>();
        require_send::<sink::SetupEvent>();
        require_sync::<sink::SetupEvent>();
        require_send::<sink::TradeIntent>();
        require_sync::<sink::TradeIntent>();

        require_send::<engine::Engine<sink::NullSink>>();
        require_send::<engine::Engine<sink::MemorySink>>();
    }
}
