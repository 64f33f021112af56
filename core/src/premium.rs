//! Premium derivation and the dynamic recalculation formula.
//!
//! Everything in this module is a pure integer function. The recalculation
//! multiplier is expressed in percent: 100 means unchanged, 150 is the
//! hard cap on increases, 70 the hard floor on discounts.

use crate::error::{LedgerError, LedgerResult};
use crate::risk_model::RiskLevel;
use crate::types::Amount;
use serde::{Deserialize, Serialize};

/// Base premium rate per risk level, in percent of coverage.
pub fn base_rate(level: RiskLevel) -> u64 {
    match level {
        RiskLevel::Low => 2,
        RiskLevel::Medium => 4,
        RiskLevel::High => 7,
        RiskLevel::Critical => 12,
    }
}

/// `premium = coverage * base_rate(level) / 100`, truncating. Coverage
/// amounts too large to quote in u64 are rejected rather than wrapped.
pub fn quote(level: RiskLevel, coverage: Amount) -> LedgerResult<Amount> {
    coverage
        .checked_mul(base_rate(level))
        .map(|scaled| scaled / 100)
        .ok_or_else(|| LedgerError::invalid(format!("coverage {coverage} too large to quote")))
}

/// Inputs to the recalculation multiplier, derived from a policy's claims
/// performance and the holder's updated health data.
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentInputs {
    pub coverage: Amount,
    pub total_claimed: Amount,
    pub claims_count: u64,
    pub new_health_score: u64,
    pub behavioral_improvement: u64,
}

/// The multiplier decision, kept around for the audit event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Adjustment {
    pub risk_adjustment: u64,
    pub improvement_bonus: u64,
    /// Final percent multiplier, always within `[70, 150]`.
    pub multiplier: u64,
}

/// Derive the percent multiplier applied to the current premium.
///
/// Risk side: claims ratio (claimed per 100 of coverage) plus a frequency
/// penalty of 5 per claim once the count exceeds 3. Improvement side: flat
/// 10 for a health score above 70, plus one point per 10 of behavioral
/// improvement. Whichever side wins sets the direction; increases cap at
/// +50%, discounts at -30%.
pub fn adjustment(inputs: AdjustmentInputs) -> Adjustment {
    // Saturating on the risk side: anything that would overflow is far
    // past the +50% cap already.
    let claims_ratio = if inputs.coverage == 0 {
        0
    } else {
        inputs.total_claimed.saturating_mul(100) / inputs.coverage
    };
    let frequency_penalty = if inputs.claims_count > 3 {
        inputs.claims_count.saturating_mul(5)
    } else {
        0
    };
    let risk_adjustment = claims_ratio.saturating_add(frequency_penalty);

    let health_bonus = if inputs.new_health_score > 70 { 10 } else { 0 };
    let behavioral_bonus = inputs.behavioral_improvement / 10;
    let improvement_bonus = health_bonus + behavioral_bonus;

    let net_adjustment = risk_adjustment.saturating_sub(improvement_bonus);

    let adjustment_multiplier = if net_adjustment > 50 {
        150
    } else {
        100 + net_adjustment
    };

    let discount_multiplier = if improvement_bonus > risk_adjustment {
        let discount = improvement_bonus - risk_adjustment;
        if discount > 30 { 70 } else { 100 - discount }
    } else {
        100
    };

    let multiplier = if adjustment_multiplier > 100 {
        adjustment_multiplier
    } else {
        discount_multiplier
    };

    Adjustment {
        risk_adjustment,
        improvement_bonus,
        multiplier,
    }
}

/// Apply a percent multiplier to a premium, truncating. Premiums too
/// large to scale in u64 are rejected rather than wrapped.
pub fn apply_multiplier(premium: Amount, multiplier: u64) -> LedgerResult<Amount> {
    premium
        .checked_mul(multiplier)
        .map(|scaled| scaled / 100)
        .ok_or_else(|| LedgerError::invalid(format!("premium {premium} too large to adjust")))
}
