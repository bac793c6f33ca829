//! SQLite snapshot archive.
//!
//! RULE: Only store.rs talks to the database. The engine itself is
//! persistence-agnostic; it exports and imports `EconomySnapshot`
//! values, and this store is where the host can shelve them.
//!
//! A missing or corrupt snapshot surfaces as an error; callers fall
//! back to a fresh engine rather than crashing.

use crate::{error::EconomyResult, snapshot::EconomySnapshot};
use rusqlite::{params, Connection, OptionalExtension};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS snapshot (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    saved_at   TEXT NOT NULL,
    state_json TEXT NOT NULL
);
";

pub struct SnapshotStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for a file
}

impl SnapshotStore {
    pub fn open(path: &str) -> EconomyResult<Self> {
        let conn = Connection::open(path)?;
        // WAL only matters for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory archive (used in tests).
    pub fn in_memory() -> EconomyResult<Self> {
        let conn = Connection::open(":memory:")?;
        Ok(Self { conn, path: None })
    }

    pub fn migrate(&self) -> EconomyResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn save_snapshot(&self, snapshot: &EconomySnapshot) -> EconomyResult<()> {
        let json = serde_json::to_string(snapshot)?;
        self.conn.execute(
            "INSERT INTO snapshot (saved_at, state_json) VALUES (?1, ?2)",
            params![snapshot.saved_at.to_rfc3339(), json],
        )?;
        log::debug!("snapshot saved ({} bytes)", json.len());
        Ok(())
    }

    /// The most recently saved snapshot, if any. Corrupt JSON is an
    /// error, not a panic; the caller decides whether to start fresh.
    pub fn load_latest(&self) -> EconomyResult<Option<EconomySnapshot>> {
        let row: Option<String> = self
            .conn
            .query_row(
                "SELECT state_json FROM snapshot ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match row {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn snapshot_count(&self) -> EconomyResult<i64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM snapshot", [], |row| row.get(0))?;
        Ok(count)
    }
}
