//! Structured store: the durable record of meetings and commitments.
//!
//! One SQLite file holds two tables. `meetings` is append-only; `commitments`
//! rows are mutated only by status transitions. Rows are never deleted, so
//! the semantic index can always be rebuilt from here (see
//! [`Recorder::reconcile`](crate::recorder::Recorder::reconcile)).

use std::path::Path;
use std::str::FromStr;

use rusqlite::Connection;

use crate::error::{EngineError, Result};
use crate::types::{Commitment, Meeting, Priority, Status};

/// Schema version stored in `PRAGMA user_version`.
/// Increment when the DDL changes and add a migration path in `open`.
const SCHEMA_VERSION: i64 = 1;

const DDL: &str = "
    CREATE TABLE IF NOT EXISTS meetings (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS commitments (
        id TEXT PRIMARY KEY,
        meeting_id TEXT NOT NULL REFERENCES meetings(id),
        meeting_title TEXT NOT NULL,
        task TEXT NOT NULL,
        owner TEXT,
        deadline TEXT,
        priority TEXT NOT NULL,
        is_vague INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'open',
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_commitments_owner ON commitments(owner);

    PRAGMA user_version = 1;
";

// ---------------------------------------------------------------------------
// CommitmentStore
// ---------------------------------------------------------------------------

pub struct CommitmentStore {
    conn: Connection,
}

impl CommitmentStore {
    /// Open (or create) the store at `path` and apply recommended pragmas.
    ///
    /// - `journal_mode = WAL` allows concurrent readers alongside a writer.
    /// - `foreign_keys = ON` enforces the commitment-to-meeting invariant.
    /// - `busy_timeout = 5000` waits up to 5 s before returning `SQLITE_BUSY`.
    pub fn open(path: &Path) -> Result<CommitmentStore> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "busy_timeout", 5000)?;

        let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        if version < SCHEMA_VERSION {
            conn.execute_batch(DDL)?;
        }

        Ok(CommitmentStore { conn })
    }

    /// In-memory store, pragmas included. Intended for tests.
    pub fn open_in_memory() -> Result<CommitmentStore> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(DDL)?;
        Ok(CommitmentStore { conn })
    }

    /// Create a meeting record and return it.
    pub fn create_meeting(&self, title: &str) -> Result<Meeting> {
        let meeting = Meeting::new(title);
        self.conn.execute(
            "INSERT INTO meetings (id, title, created_at) VALUES (?1, ?2, ?3)",
            (&meeting.id, &meeting.title, &meeting.created_at),
        )?;
        Ok(meeting)
    }

    /// Insert one commitment row.
    ///
    /// An empty task is rejected here; a reference to a missing meeting is
    /// caught by the foreign-key constraint and surfaced as `MeetingNotFound`.
    pub fn insert_commitment(&self, commitment: &Commitment) -> Result<()> {
        if commitment.task.trim().is_empty() {
            return Err(EngineError::EmptyTask);
        }
        self.conn
            .execute(
                "INSERT INTO commitments
                 (id, meeting_id, meeting_title, task, owner, deadline, priority, is_vague, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                (
                    &commitment.id,
                    &commitment.meeting_id,
                    &commitment.meeting_title,
                    &commitment.task,
                    &commitment.owner,
                    &commitment.deadline,
                    commitment.priority.as_str(),
                    commitment.is_vague as i64,
                    commitment.status.as_str(),
                    &commitment.created_at,
                ),
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(f, _)
                    if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
                {
                    EngineError::MeetingNotFound(commitment.meeting_id.clone())
                }
                other => EngineError::Store(other),
            })?;
        Ok(())
    }

    /// All commitments, newest `created_at` first.
    pub fn list_all(&self) -> Result<Vec<Commitment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, meeting_id, meeting_title, task, owner, deadline, priority, is_vague, status, created_at
             FROM commitments ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([], row_to_commitment)?;
        collect_rows(rows)
    }

    /// Commitments for one owner (exact match), newest first.
    pub fn list_by_owner(&self, owner: &str) -> Result<Vec<Commitment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, meeting_id, meeting_title, task, owner, deadline, priority, is_vague, status, created_at
             FROM commitments WHERE owner = ?1 ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([owner], row_to_commitment)?;
        collect_rows(rows)
    }

    /// How many open commitments this owner currently carries, store-wide.
    pub fn open_count_for_owner(&self, owner: &str) -> Result<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM commitments WHERE owner = ?1 AND status = 'open'",
            [owner],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    /// Every commitment id, for reconciliation sweeps against the index.
    pub fn commitment_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT id FROM commitments")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// Transition a commitment's lifecycle status.
    pub fn set_status(&self, id: &str, status: Status) -> Result<()> {
        self.conn.execute(
            "UPDATE commitments SET status = ?1 WHERE id = ?2",
            (status.as_str(), id),
        )?;
        Ok(())
    }
}

fn row_to_commitment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Commitment> {
    let priority: String = row.get(6)?;
    let status: String = row.get(8)?;
    Ok(Commitment {
        id: row.get(0)?,
        meeting_id: row.get(1)?,
        meeting_title: row.get(2)?,
        task: row.get(3)?,
        owner: row.get(4)?,
        deadline: row.get(5)?,
        priority: Priority::from_str(&priority).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?,
        is_vague: row.get::<_, i64>(7)? != 0,
        status: Status::from_str(&status).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?,
        created_at: row.get(9)?,
    })
}

fn collect_rows(
    rows: impl Iterator<Item = rusqlite::Result<Commitment>>,
) -> Result<Vec<Commitment>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
