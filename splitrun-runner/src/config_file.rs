//! TOML run configuration: the engine config plus instrument metadata,
//! loaded and validated before anything else runs.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use splitrun_core::config::EngineConfig;
use splitrun_core::domain::Instrument;

/// One run: which instrument, with which engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub instrument: Instrument,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl RunConfig {
    /// Reject a config the engine would refuse or the instrument math
    /// cannot support.
    pub fn validate(&self) -> Result<()> {
        if !(self.instrument.tick_size > 0.0) || !self.instrument.tick_size.is_finite() {
            bail!(
                "instrument {}: tick_size must be a positive number (got {})",
                self.instrument.symbol,
                self.instrument.tick_size
            );
        }
        if !(self.instrument.point_value > 0.0) || !self.instrument.point_value.is_finite() {
            bail!(
                "instrument {}: point_value must be a positive number (got {})",
                self.instrument.symbol,
                self.instrument.point_value
            );
        }
        self.engine
            .validate()
            .with_context(|| format!("invalid engine config for {}", self.instrument.symbol))?;
        Ok(())
    }
}

/// Load and validate a run configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: RunConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
