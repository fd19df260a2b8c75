use async_trait::async_trait;
use dossier_core::edit::{EditError, EditOp, FieldPath, PhotoTarget};
use dossier_core::{
    AttachError, LoadState, Mission, MissionId, MissionPatch, MissionRepository, MissionStatus,
    MissionStore, RepoError, RepoResult,
};
use image::{GenericImageView, ImageBuffer, Rgb};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory backend double; rows are kept newest-insertion-first so `list`
/// matches the creation-descending contract.
#[derive(Default)]
struct MemoryBackend {
    rows: Mutex<Vec<Mission>>,
    fail: AtomicBool,
}

impl MemoryBackend {
    fn with_rows(rows: Vec<Mission>) -> Self {
        Self {
            rows: Mutex::new(rows),
            fail: AtomicBool::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn rows(&self) -> Vec<Mission> {
        self.rows.lock().expect("row lock should not be poisoned").clone()
    }

    fn check(&self) -> RepoResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(RepoError::Remote {
                message: "backend unavailable".to_string(),
                status: Some(503),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MissionRepository for MemoryBackend {
    async fn list(&self) -> RepoResult<Vec<Mission>> {
        self.check()?;
        Ok(self.rows())
    }

    async fn insert(&self, mission: &Mission) -> RepoResult<()> {
        self.check()?;
        self.rows
            .lock()
            .expect("row lock should not be poisoned")
            .insert(0, mission.clone());
        Ok(())
    }

    async fn update(&self, id: MissionId, patch: &MissionPatch) -> RepoResult<()> {
        self.check()?;
        let mut rows = self.rows.lock().expect("row lock should not be poisoned");
        if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
            patch.apply_to(row);
        }
        Ok(())
    }

    async fn delete(&self, id: MissionId) -> RepoResult<()> {
        self.check()?;
        self.rows
            .lock()
            .expect("row lock should not be poisoned")
            .retain(|row| row.id != id);
        Ok(())
    }
}

fn fresh_store() -> (MissionStore, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::default());
    (MissionStore::new(backend.clone()), backend)
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_fn(width, height, |_, _| Rgb([90, 120, 60]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(buffer)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("test png should encode");
    bytes
}

#[tokio::test]
async fn fetch_all_replaces_the_collection() {
    let seeded = vec![Mission::new("RFV-2025-02"), Mission::new("RFV-2025-01")];
    let backend = Arc::new(MemoryBackend::with_rows(seeded.clone()));
    let mut store = MissionStore::new(backend);

    assert_eq!(store.state(), &LoadState::Idle);
    store.fetch_all().await;

    assert_eq!(store.state(), &LoadState::Idle);
    assert_eq!(store.missions(), seeded.as_slice());
}

#[tokio::test]
async fn failed_fetch_preserves_the_previous_collection() {
    let (mut store, backend) = fresh_store();
    let mission = Mission::new("RFV-2025-01");
    store
        .create(mission.clone())
        .await
        .expect("push task should complete");

    backend.set_failing(true);
    store.fetch_all().await;

    assert_eq!(
        store.state(),
        &LoadState::Error("remote backend error (503): backend unavailable".to_string())
    );
    assert_eq!(store.missions(), &[mission]);

    backend.set_failing(false);
    store.fetch_all().await;
    assert_eq!(store.state(), &LoadState::Idle);
}

#[tokio::test]
async fn create_prepends_locally_and_mirrors_remotely() {
    let (mut store, backend) = fresh_store();

    let first = Mission::new("RFV-2025-01");
    let second = Mission::new("RFV-2025-02");
    store
        .create(first.clone())
        .await
        .expect("push task should complete");
    store
        .create(second.clone())
        .await
        .expect("push task should complete");

    assert_eq!(store.missions()[0].id, second.id);
    assert_eq!(store.missions()[1].id, first.id);
    assert_eq!(backend.rows().len(), 2);
    assert_eq!(backend.rows()[0].id, second.id);
}

#[tokio::test]
async fn mutate_merges_the_patch_on_both_sides() {
    let (mut store, backend) = fresh_store();
    let mission = Mission::new("RFV-2025-01");
    store
        .create(mission.clone())
        .await
        .expect("push task should complete");

    let patch = MissionPatch {
        status: Some(MissionStatus::Approved),
        ..Default::default()
    };
    store
        .mutate(mission.id, patch)
        .await
        .expect("push task should complete");

    assert_eq!(store.missions()[0].status, MissionStatus::Approved);
    assert_eq!(backend.rows()[0].status, MissionStatus::Approved);
}

#[tokio::test]
async fn mutate_with_unknown_id_leaves_the_collection_unchanged() {
    let (mut store, backend) = fresh_store();
    let mission = Mission::new("RFV-2025-01");
    store
        .create(mission.clone())
        .await
        .expect("push task should complete");

    let patch = MissionPatch {
        title: Some("ghost".to_string()),
        ..Default::default()
    };
    store
        .mutate(uuid::Uuid::new_v4(), patch)
        .await
        .expect("push task should complete");

    assert_eq!(store.missions(), &[mission.clone()]);
    assert_eq!(backend.rows(), vec![mission]);
}

#[tokio::test]
async fn remove_filters_locally_and_mirrors_the_delete() {
    let (mut store, backend) = fresh_store();
    let keep = Mission::new("RFV-2025-01");
    let discard = Mission::new("RFV-2025-02");
    store
        .create(keep.clone())
        .await
        .expect("push task should complete");
    store
        .create(discard.clone())
        .await
        .expect("push task should complete");

    store
        .remove(discard.id)
        .await
        .expect("push task should complete");

    assert_eq!(store.missions(), &[keep.clone()]);
    assert_eq!(backend.rows(), vec![keep]);
}

#[tokio::test]
async fn remote_failure_keeps_optimistic_state() {
    let (mut store, backend) = fresh_store();
    let mission = Mission::new("RFV-2025-01");
    store
        .create(mission.clone())
        .await
        .expect("push task should complete");

    backend.set_failing(true);
    let patch = MissionPatch {
        status: Some(MissionStatus::Archived),
        ..Default::default()
    };
    store
        .mutate(mission.id, patch)
        .await
        .expect("push task should complete even when the backend fails");

    // Local state keeps the optimistic change; the backend row stays stale.
    assert_eq!(store.missions()[0].status, MissionStatus::Archived);
    assert_eq!(backend.rows()[0].status, MissionStatus::Draft);
    assert_eq!(store.state(), &LoadState::Idle);
}

#[tokio::test]
async fn apply_edit_pushes_only_the_changed_field() {
    let (mut store, backend) = fresh_store();
    let mission = Mission::new("RFV-2025-01");
    store
        .create(mission.clone())
        .await
        .expect("push task should complete");

    // Desynchronize a field the edit does not touch; a whole-aggregate push
    // would overwrite it, a partial patch must not.
    let backend_only = MissionPatch {
        title: Some("RFV-2025-01 BIS".to_string()),
        ..Default::default()
    };
    backend
        .update(mission.id, &backend_only)
        .await
        .expect("backend update should succeed");

    let task = store
        .apply_edit(mission.id, &EditOp::InsertSection)
        .expect("edit should apply")
        .expect("a matching aggregate dispatches a push");
    task.await.expect("push task should complete");

    assert_eq!(store.missions()[0].sections.len(), 4);
    assert_eq!(backend.rows()[0].sections.len(), 4);
    assert_eq!(backend.rows()[0].title, "RFV-2025-01 BIS");
}

#[tokio::test]
async fn apply_edit_surfaces_engine_errors_and_skips_unknown_ids() {
    let (mut store, _backend) = fresh_store();
    let mission = Mission::new("RFV-2025-01");
    store
        .create(mission.clone())
        .await
        .expect("push task should complete");

    let err = store
        .apply_edit(mission.id, &EditOp::RemoveSection { section: 9 })
        .expect_err("invalid index must fail");
    assert!(matches!(err, EditError::IndexOutOfRange { .. }));
    assert_eq!(store.missions()[0].sections.len(), 3);

    let dispatched = store
        .apply_edit(uuid::Uuid::new_v4(), &EditOp::InsertSection)
        .expect("unknown id should not error");
    assert!(dispatched.is_none());
}

#[tokio::test]
async fn scalar_edits_patch_their_owning_record() {
    let (mut store, backend) = fresh_store();
    let mission = Mission::new("RFV-2025-01");
    store
        .create(mission.clone())
        .await
        .expect("push task should complete");

    let task = store
        .apply_edit(
            mission.id,
            &EditOp::SetField {
                field: FieldPath::MetaLocation,
                value: "SECTEUR NORD".to_string(),
            },
        )
        .expect("edit should apply")
        .expect("a matching aggregate dispatches a push");
    task.await.expect("push task should complete");

    assert_eq!(store.missions()[0].meta.location, "SECTEUR NORD");
    assert_eq!(backend.rows()[0].meta.location, "SECTEUR NORD");
    assert_eq!(backend.rows()[0].meta.time, "0000Z");
}

#[tokio::test]
async fn attach_photo_normalizes_per_target_profile() {
    let (mut store, backend) = fresh_store();
    let mission = Mission::new("RFV-2025-01");
    store
        .create(mission.clone())
        .await
        .expect("push task should complete");

    let task = store
        .attach_photo(
            mission.id,
            PhotoTarget::Section { section: 0 },
            png_bytes(1600, 900),
        )
        .await
        .expect("attach should succeed")
        .expect("a matching aggregate dispatches a push");
    task.await.expect("push task should complete");

    let inline = &store.missions()[0].sections[0].images[0];
    let decoded = image::load_from_memory(&inline.jpeg_bytes().expect("payload should decode"))
        .expect("payload should decode as an image");
    assert_eq!(decoded.dimensions(), (1200, 675));
    assert_eq!(backend.rows()[0].sections[0].images.len(), 1);

    let task = store
        .attach_photo(mission.id, PhotoTarget::Mission, png_bytes(1600, 900))
        .await
        .expect("attach should succeed")
        .expect("a matching aggregate dispatches a push");
    task.await.expect("push task should complete");

    let annex = &store.missions()[0].images[0];
    let decoded = image::load_from_memory(&annex.jpeg_bytes().expect("payload should decode"))
        .expect("payload should decode as an image");
    assert_eq!(decoded.dimensions(), (800, 450));
}

#[tokio::test]
async fn attach_photo_reports_pipeline_and_target_failures() {
    let (mut store, _backend) = fresh_store();
    let mission = Mission::new("RFV-2025-01");
    store
        .create(mission.clone())
        .await
        .expect("push task should complete");

    let err = store
        .attach_photo(
            mission.id,
            PhotoTarget::Section { section: 0 },
            b"not a raster image".to_vec(),
        )
        .await
        .expect_err("garbage input must fail");
    assert!(matches!(err, AttachError::Photo(_)));
    assert!(store.missions()[0].sections[0].images.is_empty());

    let err = store
        .attach_photo(
            mission.id,
            PhotoTarget::Section { section: 9 },
            png_bytes(32, 32),
        )
        .await
        .expect_err("invalid target must fail");
    assert!(matches!(err, AttachError::Edit(_)));
}

#[tokio::test]
async fn next_title_increments_the_highest_serial() {
    let (mut store, _backend) = fresh_store();
    assert_eq!(store.next_title("RFV-2025-"), "RFV-2025-01");

    store
        .create(Mission::new("RFV-2025-03"))
        .await
        .expect("push task should complete");
    store
        .create(Mission::new("RFV-2025-01"))
        .await
        .expect("push task should complete");
    store
        .create(Mission::new("EXERCICE SANS SERIE"))
        .await
        .expect("push task should complete");

    assert_eq!(store.next_title("RFV-2025-"), "RFV-2025-04");
    assert_eq!(store.next_title("RFV-2026-"), "RFV-2026-01");
}
