//! Policy records.

use crate::error::{LedgerError, LedgerResult};
use crate::types::{Amount, Height, Identity, PolicyId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    Pending,
    Active,
    Suspended,
    Expired,
}

impl PolicyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Pending => "pending",
            PolicyStatus::Active => "active",
            PolicyStatus::Suspended => "suspended",
            PolicyStatus::Expired => "expired",
        }
    }
}

impl FromStr for PolicyStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> LedgerResult<Self> {
        match s {
            "pending" => Ok(PolicyStatus::Pending),
            "active" => Ok(PolicyStatus::Active),
            "suspended" => Ok(PolicyStatus::Suspended),
            "expired" => Ok(PolicyStatus::Expired),
            other => Err(LedgerError::invalid(format!("unknown policy status '{other}'"))),
        }
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One issued policy. Mutated by premium payment, claim approval, and
/// recalculation; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub policy_id: PolicyId,
    pub holder: Identity,
    pub premium: Amount,
    pub coverage: Amount,
    pub start_height: Height,
    pub end_height: Height,
    pub status: PolicyStatus,
    pub claims_count: u64,
    pub total_claimed: Amount,
}

impl Policy {
    pub fn is_active(&self) -> bool {
        self.status == PolicyStatus::Active
    }
}
