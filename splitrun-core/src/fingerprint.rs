//! Run fingerprinting — deterministic identity for a validated config.
//!
//! The hash is blake3 over the canonical JSON serialization of the config.
//! Struct field order is fixed, so the serialization is deterministic and
//! two identical configs always produce the same hash. Used to stamp log
//! files and to assert replay identity in tests.

use crate::config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// blake3 digest of a run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash([u8; 32]);

impl ConfigHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Short prefix for file names and log lines.
    pub fn short(&self) -> String {
        self.to_string()[..12].to_string()
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Hash a config via its canonical JSON form.
pub fn config_hash(config: &EngineConfig) -> ConfigHash {
    let json = serde_json::to_string(config).expect("EngineConfig must serialize");
    ConfigHash::from_bytes(json.as_bytes())
}
