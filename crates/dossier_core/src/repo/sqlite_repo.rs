//! SQLite-backed mission repository.
//!
//! # Responsibility
//! - Implement the mission CRUD contract over a local SQLite file or
//!   in-memory database.
//! - Bootstrap connections: pragmas, busy timeout, schema application.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`; a database written
//!   by a newer build is rejected, never migrated down.
//! - Each aggregate is stored as one JSON payload row; ordering comes from
//!   the `created_at` column, not the payload.

use crate::model::mission::{Mission, MissionId};
use crate::model::patch::MissionPatch;
use crate::repo::{MissionRepository, RepoError, RepoResult};
use async_trait::async_trait;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS missions (
    id TEXT PRIMARY KEY,
    payload TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_missions_created_at ON missions (created_at DESC);";

/// Mission repository persisting JSON payload rows in SQLite.
#[derive(Debug)]
pub struct SqliteMissionRepository {
    conn: Mutex<Connection>,
}

impl SqliteMissionRepository {
    /// Opens a database file and applies the schema.
    ///
    /// # Side effects
    /// - Emits timed `db_open` logging events.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let started_at = Instant::now();
        let conn = match Connection::open(path) {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=db_open module=repo status=error mode=file duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };
        Self::bootstrap(conn, "file", started_at)
    }

    /// Opens a fresh in-memory database and applies the schema.
    pub fn open_in_memory() -> RepoResult<Self> {
        let started_at = Instant::now();
        let conn = match Connection::open_in_memory() {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=db_open module=repo status=error mode=memory duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };
        Self::bootstrap(conn, "memory", started_at)
    }

    fn bootstrap(mut conn: Connection, mode: &str, started_at: Instant) -> RepoResult<Self> {
        match configure(&mut conn) {
            Ok(()) => {
                info!(
                    "event=db_open module=repo status=ok mode={mode} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self {
                    conn: Mutex::new(conn),
                })
            }
            Err(err) => {
                error!(
                    "event=db_open module=repo status=error mode={mode} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl MissionRepository for SqliteMissionRepository {
    async fn list(&self) -> RepoResult<Vec<Mission>> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT payload FROM missions ORDER BY created_at DESC, rowid DESC;")?;
        let mut rows = stmt.query([])?;
        let mut missions = Vec::new();
        while let Some(row) = rows.next()? {
            let payload: String = row.get(0)?;
            missions.push(serde_json::from_str(&payload)?);
        }
        Ok(missions)
    }

    async fn insert(&self, mission: &Mission) -> RepoResult<()> {
        let payload = serde_json::to_string(mission)?;
        let conn = self.lock();
        conn.execute(
            "INSERT INTO missions (id, payload, created_at, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000, strftime('%s', 'now') * 1000);",
            params![mission.id.to_string(), payload],
        )?;
        Ok(())
    }

    async fn update(&self, id: MissionId, patch: &MissionPatch) -> RepoResult<()> {
        let conn = self.lock();
        let stored: Option<String> = conn
            .query_row(
                "SELECT payload FROM missions WHERE id = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(payload) = stored else {
            return Ok(());
        };

        let mut mission: Mission = serde_json::from_str(&payload)?;
        patch.apply_to(&mut mission);
        let next = serde_json::to_string(&mission)?;

        conn.execute(
            "UPDATE missions
             SET payload = ?1, updated_at = strftime('%s', 'now') * 1000
             WHERE id = ?2;",
            params![next, id.to_string()],
        )?;
        Ok(())
    }

    async fn delete(&self, id: MissionId) -> RepoResult<()> {
        let conn = self.lock();
        conn.execute("DELETE FROM missions WHERE id = ?1;", [id.to_string()])?;
        Ok(())
    }
}

fn configure(conn: &mut Connection) -> RepoResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_schema(conn)
}

fn apply_schema(conn: &mut Connection) -> RepoResult<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if current > SCHEMA_VERSION {
        return Err(RepoError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if current == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    Ok(())
}
