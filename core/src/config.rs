//! Ledger configuration.
//!
//! The administrator identity is an explicit configuration value injected
//! at construction — never a hidden global. The fraud threshold is the
//! single tunable of the claims gate; everything else (risk thresholds,
//! premium base rates, adjustment caps) is a fixed part of the model and
//! lives as constants next to its formula.

use crate::types::Identity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The single privileged caller authorized for issuance, claim
    /// resolution, and model weight updates.
    pub administrator: Identity,

    /// Claims with `fraud_score >= fraud_threshold` are rejected
    /// regardless of administrator intent.
    #[serde(default = "default_fraud_threshold")]
    pub fraud_threshold: u64,
}

fn default_fraud_threshold() -> u64 {
    70
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            administrator: "admin".to_string(),
            fraud_threshold: 70,
        }
    }
}

impl LedgerConfig {
    pub fn new(administrator: impl Into<Identity>) -> Self {
        Self {
            administrator: administrator.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: LedgerConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }
}
