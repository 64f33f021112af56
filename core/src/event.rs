//! The audit event log — one event per committed operation.
//!
//! RULE: events are appended inside the same transaction as the state
//! change they describe. A committed mutation without its event, or an
//! event without its mutation, is a bug.

use crate::risk_model::{RiskLevel, WeightParam};
use crate::types::{Amount, ClaimId, Height, Identity, PolicyId};
use serde::{Deserialize, Serialize};

/// Every event the ledger can emit. Variants are added over time —
/// never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    ModelInitialized {
        height: Height,
    },
    WeightUpdated {
        height: Height,
        param: WeightParam,
        value: u64,
        version: u64,
    },
    ApplicationSubmitted {
        height: Height,
        identity: Identity,
        risk_score: u64,
        risk_level: RiskLevel,
    },
    PolicyIssued {
        height: Height,
        policy_id: PolicyId,
        holder: Identity,
        coverage: Amount,
        premium: Amount,
        end_height: Height,
    },
    PremiumPaid {
        height: Height,
        policy_id: PolicyId,
        amount: Amount,
    },
    ClaimSubmitted {
        height: Height,
        claim_id: ClaimId,
        policy_id: PolicyId,
        amount: Amount,
        fraud_score: u64,
    },
    ClaimApproved {
        height: Height,
        claim_id: ClaimId,
        policy_id: PolicyId,
        amount: Amount,
    },
    ClaimRejected {
        height: Height,
        claim_id: ClaimId,
        policy_id: PolicyId,
    },
    PremiumRecalculated {
        height: Height,
        policy_id: PolicyId,
        old_premium: Amount,
        new_premium: Amount,
        multiplier: u64,
        risk_level: RiskLevel,
    },
}

impl LedgerEvent {
    /// Stable string name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            LedgerEvent::ModelInitialized { .. } => "model_initialized",
            LedgerEvent::WeightUpdated { .. } => "weight_updated",
            LedgerEvent::ApplicationSubmitted { .. } => "application_submitted",
            LedgerEvent::PolicyIssued { .. } => "policy_issued",
            LedgerEvent::PremiumPaid { .. } => "premium_paid",
            LedgerEvent::ClaimSubmitted { .. } => "claim_submitted",
            LedgerEvent::ClaimApproved { .. } => "claim_approved",
            LedgerEvent::ClaimRejected { .. } => "claim_rejected",
            LedgerEvent::PremiumRecalculated { .. } => "premium_recalculated",
        }
    }
}

/// A persisted event log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    /// Rowid; None before insertion.
    pub id: Option<i64>,
    pub height: Height,
    /// The public operation that produced the event.
    pub operation: String,
    pub event_type: String,
    /// The serialized LedgerEvent.
    pub payload: String,
}
