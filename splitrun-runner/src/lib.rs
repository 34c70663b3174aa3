//! Splitrun Runner — host-side collaborators for the decision engine.
//!
//! The core crate decides; this crate connects it to the world a backtest
//! or live host actually lives in:
//! - TOML run configuration loading and validation
//! - CSV record sinks stamped with the config fingerprint
//! - A bar-replay harness with a simulated bracket broker

pub mod config_file;
pub mod csv_sink;
pub mod replay;

pub use config_file::{load_config, RunConfig};
pub use csv_sink::CsvSink;
pub use replay::{replay, ReplayReport};
