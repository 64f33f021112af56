//! Claim table queries and the submission / resolution commit
//! transactions.

use super::{
    add_to_counter, append_event, optional_row, text_enum, LedgerStore,
    COUNTER_CLAIMS_PAID, COUNTER_NEXT_CLAIM_ID,
};
use crate::{
    claim::{Claim, ClaimStatus},
    error::LedgerResult,
    event::EventLogEntry,
    types::{Amount, ClaimId, Height, PolicyId},
};
use rusqlite::params;

fn row_to_claim(row: &rusqlite::Row<'_>) -> rusqlite::Result<Claim> {
    Ok(Claim {
        claim_id: row.get::<_, i64>(0)? as u64,
        policy_id: row.get::<_, i64>(1)? as u64,
        claimant: row.get(2)?,
        amount: row.get::<_, i64>(3)? as u64,
        claim_type: row.get::<_, i64>(4)? as u64,
        fraud_score: row.get::<_, i64>(5)? as u64,
        status: text_enum(6, row.get::<_, String>(6)?)?,
        submitted_height: row.get::<_, i64>(7)? as u64,
        resolved_height: row.get::<_, Option<i64>>(8)?.map(|h| h as u64),
    })
}

impl LedgerStore {
    pub fn get_claim(&self, claim_id: ClaimId) -> LedgerResult<Option<Claim>> {
        optional_row(
            &self.conn,
            "SELECT claim_id, policy_id, claimant, amount, claim_type,
                    fraud_score, status, submitted_height, resolved_height
             FROM claim WHERE claim_id=?1",
            params![claim_id as i64],
            row_to_claim,
        )
    }

    /// Insert the pending claim, advance the claim-id counter, and append
    /// the audit event — one transaction.
    pub fn commit_submit_claim(
        &mut self,
        claim: &Claim,
        entry: &EventLogEntry,
    ) -> LedgerResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO claim (
                claim_id, policy_id, claimant, amount, claim_type,
                fraud_score, status, submitted_height, resolved_height
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                claim.claim_id as i64,
                claim.policy_id as i64,
                &claim.claimant,
                claim.amount as i64,
                claim.claim_type as i64,
                claim.fraud_score as i64,
                claim.status.as_str(),
                claim.submitted_height as i64,
                claim.resolved_height.map(|h| h as i64),
            ],
        )?;
        tx.execute(
            "UPDATE counter SET value=?1 WHERE name=?2",
            params![(claim.claim_id + 1) as i64, COUNTER_NEXT_CLAIM_ID],
        )?;
        append_event(&tx, entry)?;
        tx.commit()?;
        Ok(())
    }

    /// Approve a pending claim: terminal claim state, policy claim
    /// counters, and the claims-paid aggregate move together.
    pub fn commit_approve_claim(
        &mut self,
        claim_id: ClaimId,
        policy_id: PolicyId,
        amount: Amount,
        height: Height,
        entry: &EventLogEntry,
    ) -> LedgerResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE claim SET status=?1, resolved_height=?2 WHERE claim_id=?3",
            params![
                ClaimStatus::Approved.as_str(),
                height as i64,
                claim_id as i64
            ],
        )?;
        tx.execute(
            "UPDATE policy
             SET claims_count = claims_count + 1,
                 total_claimed = total_claimed + ?1
             WHERE policy_id=?2",
            params![amount as i64, policy_id as i64],
        )?;
        add_to_counter(&tx, COUNTER_CLAIMS_PAID, amount)?;
        append_event(&tx, entry)?;
        tx.commit()?;
        Ok(())
    }

    /// Reject a pending claim. The rejection is a committed terminal
    /// state; nothing else moves.
    pub fn commit_reject_claim(
        &mut self,
        claim_id: ClaimId,
        height: Height,
        entry: &EventLogEntry,
    ) -> LedgerResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE claim SET status=?1, resolved_height=?2 WHERE claim_id=?3",
            params![
                ClaimStatus::Rejected.as_str(),
                height as i64,
                claim_id as i64
            ],
        )?;
        append_event(&tx, entry)?;
        tx.commit()?;
        Ok(())
    }
}
