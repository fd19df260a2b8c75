//! Mission persistence contract and the SQLite reference backend.
//!
//! # Responsibility
//! - Define the CRUD contract the synchronization layer consumes.
//! - Keep SQL details inside the reference implementation.
//!
//! # Invariants
//! - `list` returns aggregates newest-creation-first.
//! - `update`/`delete` of an unknown id succeed as no-ops, matching the
//!   remote contract this trait mirrors.

use crate::model::mission::{Mission, MissionId};
use crate::model::patch::MissionPatch;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite_repo;

pub use sqlite_repo::SqliteMissionRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from mission persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Sqlite(rusqlite::Error),
    Payload(serde_json::Error),
    /// Remote backend failure with its human-readable message and optional
    /// status code.
    Remote {
        message: String,
        status: Option<u16>,
    },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Payload(err) => write!(f, "invalid mission payload: {err}"),
            Self::Remote { message, status } => match status {
                Some(code) => write!(f, "remote backend error ({code}): {message}"),
                None => write!(f, "remote backend error: {message}"),
            },
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Payload(err) => Some(err),
            Self::Remote { .. } | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Payload(value)
    }
}

/// CRUD contract over a table of mission rows keyed by id.
///
/// The synchronization layer consumes this trait; implementations decide
/// where the rows actually live.
#[async_trait]
pub trait MissionRepository: Send + Sync {
    /// Lists all missions, newest creation first.
    async fn list(&self) -> RepoResult<Vec<Mission>>;

    /// Inserts one mission row.
    async fn insert(&self, mission: &Mission) -> RepoResult<()>;

    /// Merges a partial update into the row with `id`. Unknown ids are
    /// success no-ops.
    async fn update(&self, id: MissionId, patch: &MissionPatch) -> RepoResult<()>;

    /// Deletes the row with `id`. Unknown ids are success no-ops.
    async fn delete(&self, id: MissionId) -> RepoResult<()>;
}
