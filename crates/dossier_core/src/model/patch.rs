//! Partial mission updates.
//!
//! A patch carries only the top-level fields a mutation changed; the same
//! value merges into the local collection and rides the remote update call,
//! so both sides apply an identical delta.

use crate::model::mission::{
    Attachment, CoordinateRow, FrequencyRow, Mission, MissionMeta, MissionStatus, Section,
    TacticalInfo,
};
use serde::{Deserialize, Serialize};

/// Field-wise partial update of a [`Mission`].
///
/// `None` fields are left untouched on merge and are skipped when the patch
/// is serialized for the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MissionMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tactical: Option<TacticalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<Vec<CoordinateRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freqs: Option<Vec<FrequencyRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MissionStatus>,
}

impl MissionPatch {
    /// Merges every present field into `mission`.
    ///
    /// The aggregate `id` is immutable and can never be patched.
    pub fn apply_to(&self, mission: &mut Mission) {
        if let Some(title) = &self.title {
            mission.title = title.clone();
        }
        if let Some(meta) = &self.meta {
            mission.meta = meta.clone();
        }
        if let Some(tactical) = &self.tactical {
            mission.tactical = tactical.clone();
        }
        if let Some(sections) = &self.sections {
            mission.sections = sections.clone();
        }
        if let Some(coords) = &self.coords {
            mission.coords = coords.clone();
        }
        if let Some(freqs) = &self.freqs {
            mission.freqs = freqs.clone();
        }
        if let Some(images) = &self.images {
            mission.images = images.clone();
        }
        if let Some(status) = self.status {
            mission.status = status;
        }
    }

    /// Returns whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.meta.is_none()
            && self.tactical.is_none()
            && self.sections.is_none()
            && self.coords.is_none()
            && self.freqs.is_none()
            && self.images.is_none()
            && self.status.is_none()
    }
}
