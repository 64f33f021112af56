//! Applicant table queries.

use super::{append_event, optional_row, text_enum, LedgerStore};
use crate::{
    applicant::{Applicant, HealthProfile},
    error::LedgerResult,
    event::EventLogEntry,
    types::Identity,
};
use rusqlite::params;

fn row_to_applicant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Applicant> {
    Ok(Applicant {
        identity: row.get(0)?,
        profile: HealthProfile {
            age: row.get::<_, i64>(1)? as u64,
            bmi: row.get::<_, i64>(2)? as u64,
            conditions: row.get::<_, i64>(3)? as u64,
            lifestyle: row.get::<_, i64>(4)? as u64,
        },
        risk_score: row.get::<_, i64>(5)? as u64,
        risk_level: text_enum(6, row.get::<_, String>(6)?)?,
        submitted_height: row.get::<_, i64>(7)? as u64,
    })
}

impl LedgerStore {
    pub fn get_applicant(&self, identity: &Identity) -> LedgerResult<Option<Applicant>> {
        optional_row(
            &self.conn,
            "SELECT identity, age, bmi, conditions, lifestyle,
                    risk_score, risk_level, submitted_height
             FROM applicant WHERE identity=?1",
            params![identity],
            row_to_applicant,
        )
    }

    /// Insert a new applicant record together with its audit event.
    pub fn commit_submit_application(
        &mut self,
        applicant: &Applicant,
        entry: &EventLogEntry,
    ) -> LedgerResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO applicant (
                identity, age, bmi, conditions, lifestyle,
                risk_score, risk_level, submitted_height
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &applicant.identity,
                applicant.profile.age as i64,
                applicant.profile.bmi as i64,
                applicant.profile.conditions as i64,
                applicant.profile.lifestyle as i64,
                applicant.risk_score as i64,
                applicant.risk_level.as_str(),
                applicant.submitted_height as i64,
            ],
        )?;
        append_event(&tx, entry)?;
        tx.commit()?;
        Ok(())
    }
}
