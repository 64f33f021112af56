//! SQLite persistence layer.
//!
//! RULE: only this module talks to the database. The engine calls store
//! methods — it never executes SQL directly.
//!
//! Every `commit_*` method runs inside one `rusqlite::Transaction` and
//! appends the operation's audit event before committing, so a state
//! change and its event are atomic. Precondition checks happen in the
//! engine before any `commit_*` call; the execution context guarantees
//! serialized, non-interleaved operations, so read-then-commit is safe.

mod applicant;
mod claim;
mod policy;

use crate::{
    engine::ContractStats,
    error::LedgerResult,
    event::EventLogEntry,
    risk_model::{ModelWeights, WeightParam, DEFAULT_WEIGHTS},
    types::Height,
};
use rusqlite::{params, Connection, OptionalExtension, Transaction};

pub const COUNTER_NEXT_POLICY_ID: &str = "next_policy_id";
pub const COUNTER_NEXT_CLAIM_ID: &str = "next_claim_id";
pub const COUNTER_PREMIUMS_COLLECTED: &str = "premiums_collected";
pub const COUNTER_CLAIMS_PAID: &str = "claims_paid";
pub const COUNTER_MODEL_VERSION: &str = "model_version";

pub struct LedgerStore {
    conn: Connection,
}

impl LedgerStore {
    /// Open (or create) the ledger database at `path`.
    pub fn open(path: &str) -> LedgerResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> LedgerResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_ledger.sql"))?;
        Ok(())
    }

    // ── Counters and aggregates ────────────────────────────────

    pub fn counter(&self, name: &str) -> LedgerResult<u64> {
        let value: i64 = self.conn.query_row(
            "SELECT value FROM counter WHERE name=?1",
            params![name],
            |r| r.get(0),
        )?;
        Ok(value as u64)
    }

    // ── Model weights ──────────────────────────────────────────

    pub fn model_weights(&self) -> LedgerResult<ModelWeights> {
        let get = |param: &str| -> LedgerResult<u64> {
            let w: i64 = self.conn.query_row(
                "SELECT weight FROM model_weight WHERE param=?1",
                params![param],
                |r| r.get(0),
            )?;
            Ok(w as u64)
        };
        Ok(ModelWeights {
            age: get("age")?,
            bmi: get("bmi")?,
            conditions: get("conditions")?,
            lifestyle: get("lifestyle")?,
        })
    }

    /// Overwrite all four weights with the defaults. Idempotent; does not
    /// touch the model version.
    pub fn commit_initialize_model(&mut self, entry: &EventLogEntry) -> LedgerResult<()> {
        let tx = self.conn.transaction()?;
        for (param, weight) in [
            ("age", DEFAULT_WEIGHTS.age),
            ("bmi", DEFAULT_WEIGHTS.bmi),
            ("conditions", DEFAULT_WEIGHTS.conditions),
            ("lifestyle", DEFAULT_WEIGHTS.lifestyle),
        ] {
            tx.execute(
                "INSERT INTO model_weight (param, weight) VALUES (?1, ?2)
                 ON CONFLICT(param) DO UPDATE SET weight=excluded.weight",
                params![param, weight as i64],
            )?;
        }
        append_event(&tx, entry)?;
        tx.commit()?;
        Ok(())
    }

    /// Set one weight and bump the model version. Returns the new version.
    pub fn commit_update_weight(
        &mut self,
        param: WeightParam,
        value: u64,
        entry: &EventLogEntry,
    ) -> LedgerResult<u64> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE model_weight SET weight=?1 WHERE param=?2",
            params![value as i64, param.as_str()],
        )?;
        tx.execute(
            "UPDATE counter SET value = value + 1 WHERE name=?1",
            params![COUNTER_MODEL_VERSION],
        )?;
        let version: i64 = tx.query_row(
            "SELECT value FROM counter WHERE name=?1",
            params![COUNTER_MODEL_VERSION],
            |r| r.get(0),
        )?;
        append_event(&tx, entry)?;
        tx.commit()?;
        Ok(version as u64)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn events_at(&self, height: Height) -> LedgerResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, height, operation, event_type, payload
             FROM event_log WHERE height=?1 ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![height as i64], row_to_event)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// The full event log in commit order. Used by the determinism test
    /// and replay tooling.
    pub fn all_events(&self) -> LedgerResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, height, operation, event_type, payload
             FROM event_log ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map([], row_to_event)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ── Aggregate statistics ───────────────────────────────────

    pub fn stats(&self) -> LedgerResult<ContractStats> {
        let policy_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM policy", [], |r| r.get(0))?;
        let claim_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM claim", [], |r| r.get(0))?;
        Ok(ContractStats {
            policy_count: policy_count as u64,
            claim_count: claim_count as u64,
            premiums_collected: self.counter(COUNTER_PREMIUMS_COLLECTED)?,
            claims_paid: self.counter(COUNTER_CLAIMS_PAID)?,
            model_version: self.counter(COUNTER_MODEL_VERSION)?,
        })
    }
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventLogEntry> {
    Ok(EventLogEntry {
        id: Some(row.get(0)?),
        height: row.get::<_, i64>(1)? as u64,
        operation: row.get(2)?,
        event_type: row.get(3)?,
        payload: row.get(4)?,
    })
}

/// Append one audit event inside an open transaction.
pub(crate) fn append_event(tx: &Transaction<'_>, entry: &EventLogEntry) -> LedgerResult<()> {
    tx.execute(
        "INSERT INTO event_log (height, operation, event_type, payload)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.height as i64,
            entry.operation,
            entry.event_type,
            entry.payload,
        ],
    )?;
    Ok(())
}

/// Bump a named counter inside an open transaction.
pub(crate) fn add_to_counter(
    tx: &Transaction<'_>,
    name: &str,
    delta: u64,
) -> LedgerResult<()> {
    tx.execute(
        "UPDATE counter SET value = value + ?1 WHERE name=?2",
        params![delta as i64, name],
    )?;
    Ok(())
}

/// Parse a TEXT column into one of the ledger enums, surfacing a parse
/// failure as a column conversion error.
pub(crate) fn text_enum<T>(idx: usize, s: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    s.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Read an optional scalar; shared by the record submodules.
pub(crate) fn optional_row<T, F>(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
    map: F,
) -> LedgerResult<Option<T>>
where
    F: FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
{
    Ok(conn.query_row(sql, params, map).optional()?)
}
