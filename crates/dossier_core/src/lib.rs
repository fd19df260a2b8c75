//! Core domain logic for Dossier, a briefing-document editor.
//! This crate is the single source of truth for the mission aggregate,
//! its mutation contract, the photo pipeline and remote synchronization.

pub mod edit;
pub mod logging;
pub mod model;
pub mod photo;
pub mod repo;
pub mod store;
pub mod sync;

pub use edit::{
    apply, CoordField, EditError, EditOp, FieldPath, FreqField, PhotoTarget,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::mission::{
    section_ordinal, sub_ordinal, Attachment, CoordinateRow, FrequencyRow, Mission, MissionId,
    MissionMeta, MissionStatus, Section, SubSection, TacticalInfo,
};
pub use model::patch::MissionPatch;
pub use photo::{archive_tone, normalize, NormalizeProfile, PhotoError};
pub use repo::{MissionRepository, RepoError, RepoResult, SqliteMissionRepository};
pub use store::{AttachError, LoadState, MissionStore};
pub use sync::{RemoteMirror, SyncTask};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
