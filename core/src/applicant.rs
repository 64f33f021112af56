//! Applicant records and health-metric validation.

use crate::error::{LedgerError, LedgerResult};
use crate::risk_model::RiskLevel;
use crate::types::{Height, Identity};
use serde::{Deserialize, Serialize};

pub const MIN_AGE: u64 = 18;
pub const MAX_AGE: u64 = 100;
pub const MIN_BMI: u64 = 15;
pub const MAX_BMI: u64 = 50;
pub const MAX_CONDITIONS: u64 = 10;
pub const MAX_LIFESTYLE: u64 = 100;

/// Health metrics as submitted by an applicant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthProfile {
    pub age: u64,
    /// Body-mass index, whole units.
    pub bmi: u64,
    /// Pre-existing condition count.
    pub conditions: u64,
    /// Lifestyle score, 0 (best) to 100 (worst).
    pub lifestyle: u64,
}

impl HealthProfile {
    pub fn validate(&self) -> LedgerResult<()> {
        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(LedgerError::invalid(format!(
                "age {} outside {MIN_AGE}..={MAX_AGE}",
                self.age
            )));
        }
        if !(MIN_BMI..=MAX_BMI).contains(&self.bmi) {
            return Err(LedgerError::invalid(format!(
                "bmi {} outside {MIN_BMI}..={MAX_BMI}",
                self.bmi
            )));
        }
        if self.conditions > MAX_CONDITIONS {
            return Err(LedgerError::invalid(format!(
                "condition count {} above {MAX_CONDITIONS}",
                self.conditions
            )));
        }
        if self.lifestyle > MAX_LIFESTYLE {
            return Err(LedgerError::invalid(format!(
                "lifestyle score {} above {MAX_LIFESTYLE}",
                self.lifestyle
            )));
        }
        Ok(())
    }
}

/// One stored applicant. One record per identity; created by submission,
/// overwritten (never duplicated) by premium recalculation, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Applicant {
    pub identity: Identity,
    pub profile: HealthProfile,
    pub risk_score: u64,
    pub risk_level: RiskLevel,
    pub submitted_height: Height,
}
