//! Domain types: bars, instruments, fills, node values, snapshots, trades.

pub mod bar;
pub mod fill;
pub mod instrument;
pub mod node_value;
pub mod snapshot;
pub mod trade;

pub use bar::{Bar, BarHistory};
pub use fill::{FillEvent, TradeSide};
pub use instrument::Instrument;
pub use node_value::NodeValue;
pub use snapshot::QualitySnapshot;
pub use trade::{CompletedTrade, ExitReason};
