//! The ledger engine — the public operation catalog.
//!
//! RULES:
//!   - Operations execute one at a time to completion; the execution
//!     context guarantees serialization, so the engine takes no locks.
//!   - Every precondition is checked before any write. A failed operation
//!     leaves all tables and counters untouched.
//!   - Logical height is supplied by the caller of each operation and is
//!     the only notion of time. No wall clock, no randomness.
//!   - Every committed operation appends exactly one audit event.

use crate::{
    applicant::{Applicant, HealthProfile},
    claim::{self, Claim, ClaimStatus, ClaimVerdict},
    config::LedgerConfig,
    error::{LedgerError, LedgerResult},
    event::{EventLogEntry, LedgerEvent},
    policy::{Policy, PolicyStatus},
    premium::{self, AdjustmentInputs},
    risk_model::{validate_weight, RiskLevel, WeightParam},
    store::{LedgerStore, COUNTER_NEXT_CLAIM_ID, COUNTER_NEXT_POLICY_ID},
    types::{Amount, ClaimId, Height, Identity, PolicyId},
};
use serde::{Deserialize, Serialize};

/// Aggregate contract statistics, readable by anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractStats {
    pub policy_count: u64,
    pub claim_count: u64,
    pub premiums_collected: u64,
    pub claims_paid: u64,
    pub model_version: u64,
}

/// Result of a submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: u64,
    pub risk_level: RiskLevel,
}

/// Result of policy issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedPolicy {
    pub policy_id: PolicyId,
    pub premium: Amount,
}

/// Result of claim submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedClaim {
    pub claim_id: ClaimId,
    pub fraud_score: u64,
}

/// Result of a premium recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumAdjustment {
    pub old_premium: Amount,
    pub new_premium: Amount,
    /// Percent change: positive for an increase, negative for a
    /// discount, zero when the multiplier was exactly 100.
    pub adjustment_percent: i64,
    pub risk_score: u64,
    pub risk_level: RiskLevel,
}

pub struct LedgerEngine {
    store: LedgerStore,
    config: LedgerConfig,
}

impl LedgerEngine {
    pub fn new(store: LedgerStore, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Build an engine on a fresh in-memory database. Used in tests and
    /// by the runner's `:memory:` mode.
    pub fn in_memory(config: LedgerConfig) -> LedgerResult<Self> {
        let store = LedgerStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(store, config))
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ── Access control ─────────────────────────────────────────

    fn require_admin(&self, caller: &Identity) -> LedgerResult<()> {
        if *caller != self.config.administrator {
            return Err(LedgerError::OwnerOnly);
        }
        Ok(())
    }

    fn require_holder(&self, caller: &Identity, policy: &Policy) -> LedgerResult<()> {
        if *caller != policy.holder {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    fn require_admin_or_holder(&self, caller: &Identity, policy: &Policy) -> LedgerResult<()> {
        if *caller != self.config.administrator && *caller != policy.holder {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    // ── Model administration ───────────────────────────────────

    /// Reset the scoring weights to their defaults. Administrator-only;
    /// idempotent overwrite. The model version is not touched — it only
    /// counts weight updates.
    pub fn initialize_model(&mut self, caller: &Identity, height: Height) -> LedgerResult<()> {
        self.require_admin(caller)?;
        let event = LedgerEvent::ModelInitialized { height };
        let entry = make_entry(height, "initialize_model", &event)?;
        self.store.commit_initialize_model(&entry)?;
        log::info!("model weights reset to defaults at height {height}");
        Ok(())
    }

    /// Set one scoring weight. Administrator-only; values above 100 are
    /// rejected. There is no bound on the sum of the four weights — the
    /// model deliberately allows scores past the usual tier assumptions.
    /// Returns the incremented model version.
    pub fn update_weight(
        &mut self,
        caller: &Identity,
        height: Height,
        param: WeightParam,
        value: u64,
    ) -> LedgerResult<u64> {
        self.require_admin(caller)?;
        validate_weight(value)?;
        // The event carries the post-update version; read it ahead.
        let version = self.store.counter(crate::store::COUNTER_MODEL_VERSION)? + 1;
        let event = LedgerEvent::WeightUpdated {
            height,
            param,
            value,
            version,
        };
        let entry = make_entry(height, "update_weight", &event)?;
        let committed = self.store.commit_update_weight(param, value, &entry)?;
        debug_assert_eq!(committed, version);
        log::info!("weight {param} set to {value}, model version {committed}");
        Ok(committed)
    }

    // ── Underwriting ───────────────────────────────────────────

    /// Submit health metrics for risk assessment. Any caller; one record
    /// per identity, duplicates rejected.
    pub fn submit_application(
        &mut self,
        caller: &Identity,
        height: Height,
        profile: HealthProfile,
    ) -> LedgerResult<RiskAssessment> {
        profile.validate()?;
        if self.store.get_applicant(caller)?.is_some() {
            return Err(LedgerError::AlreadyExists {
                entity: "applicant",
                key: caller.clone(),
            });
        }

        let weights = self.store.model_weights()?;
        let risk_score = weights.score(
            profile.age,
            profile.bmi,
            profile.conditions,
            profile.lifestyle,
        );
        let risk_level = RiskLevel::from_score(risk_score);

        let applicant = Applicant {
            identity: caller.clone(),
            profile,
            risk_score,
            risk_level,
            submitted_height: height,
        };
        let event = LedgerEvent::ApplicationSubmitted {
            height,
            identity: caller.clone(),
            risk_score,
            risk_level,
        };
        let entry = make_entry(height, "submit_application", &event)?;
        self.store.commit_submit_application(&applicant, &entry)?;

        log::debug!("application from '{caller}': score {risk_score}, level {risk_level}");
        Ok(RiskAssessment {
            risk_score,
            risk_level,
        })
    }

    // ── Policy ledger ──────────────────────────────────────────

    /// Issue a policy for an assessed applicant. Administrator-only;
    /// one active policy per holder.
    pub fn issue_policy(
        &mut self,
        caller: &Identity,
        height: Height,
        holder: &Identity,
        coverage: Amount,
        duration: Height,
    ) -> LedgerResult<IssuedPolicy> {
        self.require_admin(caller)?;
        let applicant = self.store.get_applicant(holder)?.ok_or_else(|| {
            LedgerError::NotFound {
                entity: "applicant",
                key: holder.clone(),
            }
        })?;
        if self.store.policy_by_holder(holder)?.is_some() {
            return Err(LedgerError::AlreadyExists {
                entity: "policy for holder",
                key: holder.clone(),
            });
        }

        let premium = premium::quote(applicant.risk_level, coverage)?;
        let policy_id = self.store.counter(COUNTER_NEXT_POLICY_ID)?;
        let policy = Policy {
            policy_id,
            holder: holder.clone(),
            premium,
            coverage,
            start_height: height,
            end_height: height + duration,
            status: PolicyStatus::Active,
            claims_count: 0,
            total_claimed: 0,
        };
        let event = LedgerEvent::PolicyIssued {
            height,
            policy_id,
            holder: holder.clone(),
            coverage,
            premium,
            end_height: policy.end_height,
        };
        let entry = make_entry(height, "issue_policy", &event)?;
        self.store.commit_issue_policy(&policy, &entry)?;

        log::info!("policy {policy_id} issued to '{holder}', premium {premium}");
        Ok(IssuedPolicy { policy_id, premium })
    }

    /// Pay a premium on an active policy. Holder-only; the payment feeds
    /// the premiums-collected aggregate and changes nothing else on the
    /// policy — in particular it does not extend expiry.
    pub fn pay_premium(
        &mut self,
        caller: &Identity,
        height: Height,
        policy_id: PolicyId,
        amount: Amount,
    ) -> LedgerResult<()> {
        let policy = self.fetch_policy(policy_id)?;
        self.require_holder(caller, &policy)?;
        if amount < policy.premium {
            return Err(LedgerError::InsufficientFunds {
                paid: amount,
                required: policy.premium,
            });
        }
        if !policy.is_active() {
            return Err(LedgerError::PolicyExpired { policy_id });
        }

        let event = LedgerEvent::PremiumPaid {
            height,
            policy_id,
            amount,
        };
        let entry = make_entry(height, "pay_premium", &event)?;
        self.store.commit_pay_premium(amount, &entry)?;

        log::debug!("premium {amount} paid on policy {policy_id}");
        Ok(())
    }

    // ── Claims ─────────────────────────────────────────────────

    /// Submit a claim against an active, unexpired policy. Holder-only;
    /// the fraud score is fixed at submission time.
    pub fn submit_claim(
        &mut self,
        caller: &Identity,
        height: Height,
        policy_id: PolicyId,
        amount: Amount,
        claim_type: u64,
    ) -> LedgerResult<SubmittedClaim> {
        let policy = self.fetch_policy(policy_id)?;
        self.require_holder(caller, &policy)?;
        if !policy.is_active() {
            return Err(LedgerError::PolicyExpired { policy_id });
        }
        if amount > policy.coverage {
            return Err(LedgerError::invalid(format!(
                "claim amount {amount} exceeds coverage {}",
                policy.coverage
            )));
        }
        if height >= policy.end_height {
            return Err(LedgerError::PolicyExpired { policy_id });
        }

        let fraud_score = claim::fraud_score(amount, claim_type)?;
        let claim_id = self.store.counter(COUNTER_NEXT_CLAIM_ID)?;
        let claim = Claim {
            claim_id,
            policy_id,
            claimant: caller.clone(),
            amount,
            claim_type,
            fraud_score,
            status: ClaimStatus::Pending,
            submitted_height: height,
            resolved_height: None,
        };
        let event = LedgerEvent::ClaimSubmitted {
            height,
            claim_id,
            policy_id,
            amount,
            fraud_score,
        };
        let entry = make_entry(height, "submit_claim", &event)?;
        self.store.commit_submit_claim(&claim, &entry)?;

        log::debug!("claim {claim_id} submitted on policy {policy_id}, fraud score {fraud_score}");
        Ok(SubmittedClaim {
            claim_id,
            fraud_score,
        })
    }

    /// Resolve a pending claim. Administrator-only. Approval happens iff
    /// the administrator intends it AND the fraud score is below the
    /// configured threshold — the fraud gate overrides intent
    /// unconditionally. Either way the claim reaches a committed terminal
    /// state; the verdict tells the caller which one.
    pub fn resolve_claim(
        &mut self,
        caller: &Identity,
        height: Height,
        claim_id: ClaimId,
        approve: bool,
    ) -> LedgerResult<ClaimVerdict> {
        self.require_admin(caller)?;
        let claim = self
            .store
            .get_claim(claim_id)?
            .ok_or(LedgerError::NotFound {
                entity: "claim",
                key: claim_id.to_string(),
            })?;
        if claim.status != ClaimStatus::Pending {
            return Err(LedgerError::invalid(format!(
                "claim {claim_id} already resolved"
            )));
        }

        if approve && claim.fraud_score < self.config.fraud_threshold {
            let event = LedgerEvent::ClaimApproved {
                height,
                claim_id,
                policy_id: claim.policy_id,
                amount: claim.amount,
            };
            let entry = make_entry(height, "resolve_claim", &event)?;
            self.store.commit_approve_claim(
                claim_id,
                claim.policy_id,
                claim.amount,
                height,
                &entry,
            )?;
            log::info!("claim {claim_id} approved for {}", claim.amount);
            Ok(ClaimVerdict::Approved)
        } else {
            let event = LedgerEvent::ClaimRejected {
                height,
                claim_id,
                policy_id: claim.policy_id,
            };
            let entry = make_entry(height, "resolve_claim", &event)?;
            self.store.commit_reject_claim(claim_id, height, &entry)?;
            log::info!(
                "claim {claim_id} rejected (intent: {approve}, fraud score {})",
                claim.fraud_score
            );
            Ok(ClaimVerdict::Rejected)
        }
    }

    // ── Premium recalculation ──────────────────────────────────

    /// Re-derive a policy's premium from claims performance and updated
    /// health data. Administrator or holder. The multiplier is clamped to
    /// 70..=150 percent of the prior premium; the applicant record is
    /// refreshed with the new lifestyle input and risk assessment.
    pub fn recompute_premium(
        &mut self,
        caller: &Identity,
        height: Height,
        policy_id: PolicyId,
        new_health_score: u64,
        behavioral_improvement: u64,
    ) -> LedgerResult<PremiumAdjustment> {
        let policy = self.fetch_policy(policy_id)?;
        self.require_admin_or_holder(caller, &policy)?;
        if !policy.is_active() {
            return Err(LedgerError::PolicyExpired { policy_id });
        }
        if new_health_score > 100 {
            return Err(LedgerError::invalid(format!(
                "health score {new_health_score} above 100"
            )));
        }
        if behavioral_improvement > 100 {
            return Err(LedgerError::invalid(format!(
                "behavioral improvement {behavioral_improvement} above 100"
            )));
        }
        let applicant =
            self.store
                .get_applicant(&policy.holder)?
                .ok_or(LedgerError::NotFound {
                    entity: "applicant",
                    key: policy.holder.clone(),
                })?;

        let adjustment = premium::adjustment(AdjustmentInputs {
            coverage: policy.coverage,
            total_claimed: policy.total_claimed,
            claims_count: policy.claims_count,
            new_health_score,
            behavioral_improvement,
        });
        let new_premium = premium::apply_multiplier(policy.premium, adjustment.multiplier)?;

        // Rescore with the new health score standing in for lifestyle.
        let weights = self.store.model_weights()?;
        let risk_score = weights.score(
            applicant.profile.age,
            applicant.profile.bmi,
            applicant.profile.conditions,
            new_health_score,
        );
        let risk_level = RiskLevel::from_score(risk_score);

        let event = LedgerEvent::PremiumRecalculated {
            height,
            policy_id,
            old_premium: policy.premium,
            new_premium,
            multiplier: adjustment.multiplier,
            risk_level,
        };
        let entry = make_entry(height, "recompute_premium", &event)?;
        self.store.commit_recalculation(
            policy_id,
            new_premium,
            &policy.holder,
            new_health_score,
            risk_score,
            risk_level,
            &entry,
        )?;

        let adjustment_percent = adjustment.multiplier as i64 - 100;
        log::info!(
            "policy {policy_id} premium {} -> {new_premium} ({adjustment_percent:+}%)",
            policy.premium
        );
        Ok(PremiumAdjustment {
            old_premium: policy.premium,
            new_premium,
            adjustment_percent,
            risk_score,
            risk_level,
        })
    }

    // ── Read-only queries ──────────────────────────────────────

    pub fn applicant(&self, identity: &Identity) -> LedgerResult<Option<Applicant>> {
        self.store.get_applicant(identity)
    }

    pub fn policy(&self, policy_id: PolicyId) -> LedgerResult<Option<Policy>> {
        self.store.get_policy(policy_id)
    }

    pub fn claim(&self, claim_id: ClaimId) -> LedgerResult<Option<Claim>> {
        self.store.get_claim(claim_id)
    }

    pub fn stats(&self) -> LedgerResult<ContractStats> {
        self.store.stats()
    }

    pub fn events_at(&self, height: Height) -> LedgerResult<Vec<EventLogEntry>> {
        self.store.events_at(height)
    }

    /// Full audit log in commit order.
    pub fn audit_log(&self) -> LedgerResult<Vec<EventLogEntry>> {
        self.store.all_events()
    }

    fn fetch_policy(&self, policy_id: PolicyId) -> LedgerResult<Policy> {
        self.store
            .get_policy(policy_id)?
            .ok_or(LedgerError::NotFound {
                entity: "policy",
                key: policy_id.to_string(),
            })
    }
}

fn make_entry(
    height: Height,
    operation: &'static str,
    event: &LedgerEvent,
) -> LedgerResult<EventLogEntry> {
    Ok(EventLogEntry {
        id: None,
        height,
        operation: operation.to_string(),
        event_type: event.type_name().to_string(),
        payload: serde_json::to_string(event)?,
    })
}
