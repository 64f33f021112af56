//! Risk scoring model.
//!
//! The "AI" here is a fixed deterministic weighted formula, not a trained
//! model. Keep it that way: the whole ledger depends on same inputs plus
//! same weights always producing the same score.

use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum value of any single scoring weight.
pub const MAX_WEIGHT: u64 = 100;

/// Default weights: age 25, bmi 30, conditions 35, lifestyle 10.
pub const DEFAULT_WEIGHTS: ModelWeights = ModelWeights {
    age: 25,
    bmi: 30,
    conditions: 35,
    lifestyle: 10,
};

/// The four named scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightParam {
    Age,
    Bmi,
    Conditions,
    Lifestyle,
}

impl WeightParam {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightParam::Age => "age",
            WeightParam::Bmi => "bmi",
            WeightParam::Conditions => "conditions",
            WeightParam::Lifestyle => "lifestyle",
        }
    }
}

impl FromStr for WeightParam {
    type Err = LedgerError;

    fn from_str(s: &str) -> LedgerResult<Self> {
        match s {
            "age" => Ok(WeightParam::Age),
            "bmi" => Ok(WeightParam::Bmi),
            "conditions" => Ok(WeightParam::Conditions),
            "lifestyle" => Ok(WeightParam::Lifestyle),
            other => Err(LedgerError::invalid(format!("unknown weight param '{other}'"))),
        }
    }
}

impl fmt::Display for WeightParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The versioned weight table, one weight per health metric.
/// Administrator-owned; the version counter lives in the counter table
/// and is incremented on every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelWeights {
    pub age: u64,
    pub bmi: u64,
    pub conditions: u64,
    pub lifestyle: u64,
}

impl ModelWeights {
    pub fn get(&self, param: WeightParam) -> u64 {
        match param {
            WeightParam::Age => self.age,
            WeightParam::Bmi => self.bmi,
            WeightParam::Conditions => self.conditions,
            WeightParam::Lifestyle => self.lifestyle,
        }
    }

    /// Compute the risk score for one set of health metrics.
    ///
    /// Each term is `metric * weight / 100` with truncating integer
    /// division, summed. The truncation is intentional and must not be
    /// "fixed" with rounding — compatibility tests depend on it.
    pub fn score(&self, age: u64, bmi: u64, conditions: u64, lifestyle: u64) -> u64 {
        age * self.age / 100
            + bmi * self.bmi / 100
            + conditions * self.conditions / 100
            + lifestyle * self.lifestyle / 100
    }
}

/// Validate a single weight update. There is deliberately no bound on the
/// sum of the four weights; only each individual value is capped.
pub fn validate_weight(value: u64) -> LedgerResult<()> {
    if value > MAX_WEIGHT {
        return Err(LedgerError::invalid(format!(
            "weight {value} exceeds maximum {MAX_WEIGHT}"
        )));
    }
    Ok(())
}

/// Risk level, a pure total function of the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Fixed thresholds, inclusive on the lower bucket:
    /// score 30 is Low, 31 is Medium, 60 is Medium, 61 is High,
    /// 85 is High, 86 is Critical.
    pub fn from_score(score: u64) -> Self {
        match score {
            0..=30 => RiskLevel::Low,
            31..=60 => RiskLevel::Medium,
            61..=85 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = LedgerError;

    fn from_str(s: &str) -> LedgerResult<Self> {
        match s {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            other => Err(LedgerError::invalid(format!("unknown risk level '{other}'"))),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
