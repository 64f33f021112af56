//! Claim records and the fraud-score formula.

use crate::error::{LedgerError, LedgerResult};
use crate::types::{Amount, ClaimId, Height, Identity, PolicyId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deterministic placeholder fraud indicator in `0..100`.
///
/// `(amount + claim_type * 7) mod 100` — a fixed formula dressed as model
/// inference. Do not replace it with anything statistical; the claims gate
/// must stay reproducible. The claim-type code is otherwise unvalidated,
/// so the sum is computed checked and an overflowing input is rejected.
pub fn fraud_score(amount: Amount, claim_type: u64) -> LedgerResult<u64> {
    let weighted = claim_type
        .checked_mul(7)
        .and_then(|w| amount.checked_add(w))
        .ok_or_else(|| {
            LedgerError::invalid(format!("claim type code {claim_type} too large"))
        })?;
    Ok(weighted % 100)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ClaimStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> LedgerResult<Self> {
        match s {
            "pending" => Ok(ClaimStatus::Pending),
            "approved" => Ok(ClaimStatus::Approved),
            "rejected" => Ok(ClaimStatus::Rejected),
            other => Err(LedgerError::invalid(format!("unknown claim status '{other}'"))),
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of `resolve_claim`. Rejection is a committed terminal state
/// reported as a normal result, not an aborted transaction — callers must
/// distinguish "failed, nothing changed" from "succeeded, outcome is
/// rejection".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimVerdict {
    Approved,
    Rejected,
}

/// One claim against a policy. Created by submission, mutated exactly once
/// by resolution, then immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: ClaimId,
    pub policy_id: PolicyId,
    pub claimant: Identity,
    pub amount: Amount,
    pub claim_type: u64,
    pub fraud_score: u64,
    pub status: ClaimStatus,
    pub submitted_height: Height,
    /// None while the claim is Pending; set exactly once at resolution.
    pub resolved_height: Option<Height>,
}
