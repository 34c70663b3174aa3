//! CSV record sink: run-stamped decision and trade logs.
//!
//! Each run writes three files named by the config fingerprint, each
//! opening with a `#CONFIG` echo line so a log file is self-describing.
//! Sink callbacks cannot fail, so IO errors are deferred and surfaced by
//! `finish()`.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use splitrun_core::config::EngineConfig;
use splitrun_core::domain::CompletedTrade;
use splitrun_core::fingerprint::config_hash;
use splitrun_core::sink::{RecordSink, SetupEvent, TradeIntent};

pub struct CsvSink {
    setups: csv::Writer<File>,
    intents: csv::Writer<File>,
    trades: csv::Writer<File>,
    paths: [PathBuf; 3],
    deferred_error: Option<anyhow::Error>,
}

impl CsvSink {
    /// Open the three run files under `dir`, named by the config hash,
    /// and write the `#CONFIG` echo plus headers.
    pub fn create(dir: &Path, config: &EngineConfig) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output dir {}", dir.display()))?;
        let stamp = config_hash(config).short();
        let config_json =
            serde_json::to_string(config).context("failed to serialize config for the echo line")?;

        let setups_path = dir.join(format!("setups_{stamp}.csv"));
        let intents_path = dir.join(format!("intents_{stamp}.csv"));
        let trades_path = dir.join(format!("trades_{stamp}.csv"));

        let mut setups = open_with_echo(&setups_path, &config_json)?;
        setups.write_record([
            "timestamp",
            "status",
            "side",
            "reason",
            "price",
            "total_new",
            "session_weight",
            "regime",
        ])?;

        let mut intents = open_with_echo(&intents_path, &config_json)?;
        intents.write_record([
            "timestamp", "leg", "side", "quantity", "entry", "stop", "target",
        ])?;

        let mut trades = open_with_echo(&trades_path, &config_json)?;
        trades.write_record([
            "entry_time",
            "exit_time",
            "side",
            "quantity",
            "entry_price",
            "exit_price",
            "planned_stop",
            "planned_target",
            "exit_reason",
            "pnl_ticks",
            "pnl_currency",
            "r_multiple",
            "entry_regime",
            "entry_total_new",
            "entry_momentum_core",
            "entry_pos_vol_proxy",
        ])?;

        Ok(Self {
            setups,
            intents,
            trades,
            paths: [setups_path, intents_path, trades_path],
            deferred_error: None,
        })
    }

    /// Paths of the setup, intent, and trade files, in that order.
    pub fn paths(&self) -> &[PathBuf; 3] {
        &self.paths
    }

    /// Flush everything and surface the first error any callback hit.
    pub fn finish(mut self) -> Result<()> {
        if let Some(err) = self.deferred_error.take() {
            return Err(err);
        }
        self.setups.flush().context("failed to flush setups csv")?;
        self.intents.flush().context("failed to flush intents csv")?;
        self.trades.flush().context("failed to flush trades csv")?;
        Ok(())
    }

    fn record(&mut self, result: csv::Result<()>) {
        if self.deferred_error.is_none() {
            if let Err(err) = result {
                self.deferred_error = Some(err.into());
            }
        }
    }
}

fn open_with_echo(path: &Path, config_json: &str) -> Result<csv::Writer<File>> {
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    writeln!(file, "#CONFIG {config_json}")
        .with_context(|| format!("failed to write config echo to {}", path.display()))?;
    Ok(csv::Writer::from_writer(file))
}

impl RecordSink for CsvSink {
    fn setup_event(&mut self, event: &SetupEvent) {
        let result = self.setups.write_record([
            event.timestamp.to_rfc3339(),
            format!("{:?}", event.status),
            event.side.label().to_string(),
            event.reason.clone(),
            format!("{:.6}", event.price),
            format!("{:.6}", event.total_new),
            format!("{:.6}", event.session_weight),
            event.regime.label().to_string(),
        ]);
        self.record(result);
    }

    fn trade_intent(&mut self, intent: &TradeIntent) {
        let result = self.intents.write_record([
            intent.timestamp.to_rfc3339(),
            intent.leg.order_label().to_string(),
            intent.side.label().to_string(),
            intent.quantity.to_string(),
            format!("{:.6}", intent.entry),
            format!("{:.6}", intent.stop),
            format!("{:.6}", intent.target),
        ]);
        self.record(result);
    }

    fn trade_completed(&mut self, trade: &CompletedTrade) {
        let result = self.trades.write_record([
            trade.entry_time.to_rfc3339(),
            trade.exit_time.to_rfc3339(),
            trade.side.label().to_string(),
            trade.quantity.to_string(),
            format!("{:.6}", trade.entry_price),
            format!("{:.6}", trade.exit_price),
            format!("{:.6}", trade.planned_stop),
            format!("{:.6}", trade.planned_target),
            trade.exit_reason.label().to_string(),
            format!("{:.2}", trade.pnl_ticks),
            format!("{:.2}", trade.pnl_currency),
            format!("{:.4}", trade.r_multiple),
            trade.entry_regime.label().to_string(),
            format!("{:.6}", trade.entry_snapshot.total_new),
            format!("{:.6}", trade.entry_snapshot.momentum_core),
            format!("{:.6}", trade.entry_snapshot.pos_vol_proxy),
        ]);
        self.record(result);
    }
}
