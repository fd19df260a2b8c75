//! Fire-and-forget push of CRUD calls to the persistence backend.

use crate::model::mission::{Mission, MissionId};
use crate::model::patch::MissionPatch;
use crate::repo::{MissionRepository, RepoError, RepoResult};
use log::{error, info};
use std::sync::Arc;
use std::time::Instant;

/// Handle of one in-flight remote push.
///
/// The local mutation is already applied when a task is handed out; callers
/// may drop the handle, or await it when they need the mirror settled.
pub type SyncTask = tokio::task::JoinHandle<()>;

/// Best-effort mirror of the in-memory collection onto a repository.
#[derive(Clone)]
pub struct RemoteMirror {
    repo: Arc<dyn MissionRepository>,
}

impl RemoteMirror {
    pub fn new(repo: Arc<dyn MissionRepository>) -> Self {
        Self { repo }
    }

    /// Loads the full backend collection, newest creation first.
    ///
    /// This is the one call the store awaits; pushes never block it.
    pub async fn fetch(&self) -> RepoResult<Vec<Mission>> {
        self.repo.list().await
    }

    /// Pushes an insert for a freshly created aggregate.
    pub fn push_insert(&self, mission: Mission) -> SyncTask {
        let repo = self.repo.clone();
        tokio::spawn(async move {
            let started_at = Instant::now();
            let id = mission.id;
            match repo.insert(&mission).await {
                Ok(()) => info!(
                    "event=remote_push module=sync op=insert mission={id} status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                ),
                Err(err) => log_push_failure("insert", id, started_at, &err),
            }
        })
    }

    /// Pushes a partial update for one aggregate.
    pub fn push_update(&self, id: MissionId, patch: MissionPatch) -> SyncTask {
        let repo = self.repo.clone();
        tokio::spawn(async move {
            let started_at = Instant::now();
            match repo.update(id, &patch).await {
                Ok(()) => info!(
                    "event=remote_push module=sync op=update mission={id} status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                ),
                Err(err) => log_push_failure("update", id, started_at, &err),
            }
        })
    }

    /// Pushes a delete for one aggregate.
    pub fn push_delete(&self, id: MissionId) -> SyncTask {
        let repo = self.repo.clone();
        tokio::spawn(async move {
            let started_at = Instant::now();
            match repo.delete(id).await {
                Ok(()) => info!(
                    "event=remote_push module=sync op=delete mission={id} status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                ),
                Err(err) => log_push_failure("delete", id, started_at, &err),
            }
        })
    }
}

fn log_push_failure(op: &str, id: MissionId, started_at: Instant, err: &RepoError) {
    let status_code = match err {
        RepoError::Remote {
            status: Some(code), ..
        } => code.to_string(),
        _ => "none".to_string(),
    };
    error!(
        "event=remote_push module=sync op={op} mission={id} status=error status_code={status_code} duration_ms={} error={err}",
        started_at.elapsed().as_millis()
    );
}
