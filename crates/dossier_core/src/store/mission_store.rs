//! Mission store: optimistic state container over the remote mirror.
//!
//! The store is injected where it is needed; there is no ambient singleton.
//! Mutations take `&mut self`, so one logical writer is enforced by the
//! borrow checker and collection replacement stays copy-on-write.

use crate::edit::{self, EditError, EditOp, FieldPath, PhotoTarget};
use crate::model::mission::{Mission, MissionId};
use crate::model::patch::MissionPatch;
use crate::photo::{self, NormalizeProfile, PhotoError};
use crate::repo::MissionRepository;
use crate::sync::{RemoteMirror, SyncTask};
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Collection loading state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Error(String),
}

/// Errors from the photo attachment flow.
#[derive(Debug)]
pub enum AttachError {
    Photo(PhotoError),
    Edit(EditError),
}

impl Display for AttachError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Photo(err) => write!(f, "{err}"),
            Self::Edit(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AttachError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Photo(err) => Some(err),
            Self::Edit(err) => Some(err),
        }
    }
}

impl From<PhotoError> for AttachError {
    fn from(value: PhotoError) -> Self {
        Self::Photo(value)
    }
}

impl From<EditError> for AttachError {
    fn from(value: EditError) -> Self {
        Self::Edit(value)
    }
}

/// Process-wide mission collection with optimistic remote mirroring.
///
/// Requires a Tokio runtime context: remote pushes are spawned tasks and the
/// photo pipeline runs on a blocking worker.
pub struct MissionStore {
    missions: Vec<Mission>,
    state: LoadState,
    remote: RemoteMirror,
}

impl MissionStore {
    /// Creates an empty store mirrored onto `repo`.
    pub fn new(repo: Arc<dyn MissionRepository>) -> Self {
        Self {
            missions: Vec::new(),
            state: LoadState::Idle,
            remote: RemoteMirror::new(repo),
        }
    }

    /// Current collection, newest creation first.
    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn get(&self, id: MissionId) -> Option<&Mission> {
        self.missions.iter().find(|mission| mission.id == id)
    }

    /// Replaces the collection from the backend.
    ///
    /// # Contract
    /// - Transitions to `Loading` for the duration of the call.
    /// - Success replaces the whole collection and lands on `Idle`.
    /// - Failure keeps the previous collection, records the message and
    ///   lands on `Error`.
    pub async fn fetch_all(&mut self) {
        self.state = LoadState::Loading;
        match self.remote.fetch().await {
            Ok(missions) => {
                self.missions = missions;
                self.state = LoadState::Idle;
            }
            Err(err) => {
                error!("event=fetch_all module=store status=error error={err}");
                self.state = LoadState::Error(err.to_string());
            }
        }
    }

    /// Prepends a new aggregate and pushes the remote insert.
    pub fn create(&mut self, mission: Mission) -> SyncTask {
        self.missions.insert(0, mission.clone());
        self.remote.push_insert(mission)
    }

    /// Merges a partial update into the matching aggregate and pushes the
    /// same patch remotely.
    ///
    /// An unknown id leaves the collection untouched; the remote update is
    /// still dispatched and lands as a backend no-op.
    pub fn mutate(&mut self, id: MissionId, patch: MissionPatch) -> SyncTask {
        if let Some(existing) = self.missions.iter_mut().find(|mission| mission.id == id) {
            patch.apply_to(existing);
        }
        self.remote.push_update(id, patch)
    }

    /// Filters the aggregate out of the collection and pushes the delete.
    pub fn remove(&mut self, id: MissionId) -> SyncTask {
        self.missions.retain(|mission| mission.id != id);
        self.remote.push_delete(id)
    }

    /// Runs one engine operation against the aggregate with `id`.
    ///
    /// The remote update carries only the top-level field the operation
    /// changed. Returns `Ok(None)` without dispatching when no aggregate
    /// matches; engine errors surface synchronously.
    pub fn apply_edit(&mut self, id: MissionId, op: &EditOp) -> Result<Option<SyncTask>, EditError> {
        let Some(index) = self.missions.iter().position(|mission| mission.id == id) else {
            return Ok(None);
        };
        let next = edit::apply(&self.missions[index], op)?;
        let patch = patch_for(op, &next);
        self.missions[index] = next;
        Ok(Some(self.remote.push_update(id, patch)))
    }

    /// Normalizes raw image bytes off the edit path, then attaches the
    /// result to `target`.
    ///
    /// Mission-level targets use the archive profile; section and
    /// sub-section targets the inline profile. The attachment only becomes
    /// visible once the pipeline has fully completed.
    pub async fn attach_photo(
        &mut self,
        id: MissionId,
        target: PhotoTarget,
        bytes: Vec<u8>,
    ) -> Result<Option<SyncTask>, AttachError> {
        let profile = match target {
            PhotoTarget::Mission => NormalizeProfile::archive(),
            PhotoTarget::Section { .. } | PhotoTarget::SubSection { .. } => {
                NormalizeProfile::inline()
            }
        };
        let attachment = tokio::task::spawn_blocking(move || photo::normalize(&bytes, &profile))
            .await
            .map_err(|err| PhotoError::WorkerLost(err.to_string()))??;

        self.apply_edit(id, &EditOp::AttachImage { target, attachment })
            .map_err(AttachError::Edit)
    }

    /// Next serial code-name for `prefix`, two-digit padded.
    ///
    /// Scans existing titles such as `RFV-2026-03` and returns the highest
    /// serial plus one (`RFV-2026-04`), starting at `01`.
    pub fn next_title(&self, prefix: &str) -> String {
        let highest = self
            .missions
            .iter()
            .filter_map(|mission| mission.title.strip_prefix(prefix)?.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("{prefix}{:02}", highest + 1)
    }
}

fn patch_for(op: &EditOp, next: &Mission) -> MissionPatch {
    let mut patch = MissionPatch::default();
    match op {
        EditOp::SetField { field, .. } => match field {
            FieldPath::Title => patch.title = Some(next.title.clone()),
            FieldPath::MetaDate
            | FieldPath::MetaTime
            | FieldPath::MetaLocation
            | FieldPath::MetaWeather => patch.meta = Some(next.meta.clone()),
            FieldPath::TacticalAllies | FieldPath::TacticalRoe => {
                patch.tactical = Some(next.tactical.clone());
            }
            FieldPath::Status => patch.status = Some(next.status),
        },
        EditOp::InsertSection
        | EditOp::RemoveSection { .. }
        | EditOp::RenameSection { .. }
        | EditOp::InsertSubSection { .. }
        | EditOp::RemoveSubSection { .. }
        | EditOp::RenameSubSection { .. }
        | EditOp::EditContent { .. } => patch.sections = Some(next.sections.clone()),
        EditOp::AttachImage { target, .. }
        | EditOp::DetachImage { target, .. }
        | EditOp::SetCaption { target, .. } => match target {
            PhotoTarget::Mission => patch.images = Some(next.images.clone()),
            PhotoTarget::Section { .. } | PhotoTarget::SubSection { .. } => {
                patch.sections = Some(next.sections.clone());
            }
        },
        EditOp::AddCoordRow | EditOp::RemoveCoordRow { .. } | EditOp::EditCoordRow { .. } => {
            patch.coords = Some(next.coords.clone());
        }
        EditOp::AddFreqRow | EditOp::RemoveFreqRow { .. } | EditOp::EditFreqRow { .. } => {
            patch.freqs = Some(next.freqs.clone());
        }
    }
    patch
}
