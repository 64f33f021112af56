//! Policy table queries and the issuance / payment / recalculation
//! commit transactions.

use super::{
    add_to_counter, append_event, optional_row, text_enum, LedgerStore,
    COUNTER_NEXT_POLICY_ID, COUNTER_PREMIUMS_COLLECTED,
};
use crate::{
    error::LedgerResult,
    event::EventLogEntry,
    policy::Policy,
    risk_model::RiskLevel,
    types::{Amount, Identity, PolicyId},
};
use rusqlite::params;

fn row_to_policy(row: &rusqlite::Row<'_>) -> rusqlite::Result<Policy> {
    Ok(Policy {
        policy_id: row.get::<_, i64>(0)? as u64,
        holder: row.get(1)?,
        premium: row.get::<_, i64>(2)? as u64,
        coverage: row.get::<_, i64>(3)? as u64,
        start_height: row.get::<_, i64>(4)? as u64,
        end_height: row.get::<_, i64>(5)? as u64,
        status: text_enum(6, row.get::<_, String>(6)?)?,
        claims_count: row.get::<_, i64>(7)? as u64,
        total_claimed: row.get::<_, i64>(8)? as u64,
    })
}

const POLICY_COLUMNS: &str = "policy_id, holder, premium, coverage,
    start_height, end_height, status, claims_count, total_claimed";

impl LedgerStore {
    pub fn get_policy(&self, policy_id: PolicyId) -> LedgerResult<Option<Policy>> {
        optional_row(
            &self.conn,
            &format!("SELECT {POLICY_COLUMNS} FROM policy WHERE policy_id=?1"),
            params![policy_id as i64],
            row_to_policy,
        )
    }

    /// The holder→policy index: at most one policy per holder.
    pub fn policy_by_holder(&self, holder: &Identity) -> LedgerResult<Option<Policy>> {
        optional_row(
            &self.conn,
            &format!("SELECT {POLICY_COLUMNS} FROM policy WHERE holder=?1"),
            params![holder],
            row_to_policy,
        )
    }

    /// Insert the issued policy, advance the policy-id counter, and append
    /// the audit event — one transaction.
    pub fn commit_issue_policy(
        &mut self,
        policy: &Policy,
        entry: &EventLogEntry,
    ) -> LedgerResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO policy (
                policy_id, holder, premium, coverage, start_height,
                end_height, status, claims_count, total_claimed
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                policy.policy_id as i64,
                &policy.holder,
                policy.premium as i64,
                policy.coverage as i64,
                policy.start_height as i64,
                policy.end_height as i64,
                policy.status.as_str(),
                policy.claims_count as i64,
                policy.total_claimed as i64,
            ],
        )?;
        tx.execute(
            "UPDATE counter SET value=?1 WHERE name=?2",
            params![(policy.policy_id + 1) as i64, COUNTER_NEXT_POLICY_ID],
        )?;
        append_event(&tx, entry)?;
        tx.commit()?;
        Ok(())
    }

    /// Record a premium payment. The only state change is the global
    /// premiums-collected aggregate — expiry is not extended.
    pub fn commit_pay_premium(
        &mut self,
        amount: Amount,
        entry: &EventLogEntry,
    ) -> LedgerResult<()> {
        let tx = self.conn.transaction()?;
        add_to_counter(&tx, COUNTER_PREMIUMS_COLLECTED, amount)?;
        append_event(&tx, entry)?;
        tx.commit()?;
        Ok(())
    }

    /// Apply a premium recalculation: new policy premium plus the
    /// applicant's refreshed lifestyle score and risk assessment.
    #[allow(clippy::too_many_arguments)]
    pub fn commit_recalculation(
        &mut self,
        policy_id: PolicyId,
        new_premium: Amount,
        holder: &Identity,
        new_lifestyle: u64,
        new_risk_score: u64,
        new_risk_level: RiskLevel,
        entry: &EventLogEntry,
    ) -> LedgerResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE policy SET premium=?1 WHERE policy_id=?2",
            params![new_premium as i64, policy_id as i64],
        )?;
        tx.execute(
            "UPDATE applicant SET lifestyle=?1, risk_score=?2, risk_level=?3
             WHERE identity=?4",
            params![
                new_lifestyle as i64,
                new_risk_score as i64,
                new_risk_level.as_str(),
                holder,
            ],
        )?;
        append_event(&tx, entry)?;
        tx.commit()?;
        Ok(())
    }
}
