//! Mission aggregate and its nested entities.
//!
//! # Responsibility
//! - Define the briefing record: metadata, sections, tabular rows, photos.
//! - Seed new missions with the canonical briefing skeleton.
//!
//! # Invariants
//! - `id` fields are unique within their containing collection and immutable
//!   after creation.
//! - `sections`, `subs`, `coords`, `freqs` and every `images` sequence are
//!   empty rather than null.
//! - Display ordinals are derived from position, never persisted.

use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a mission aggregate.
pub type MissionId = Uuid;

const INLINE_JPEG_PREFIX: &str = "data:image/jpeg;base64,";

/// Lifecycle state of a mission dossier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Draft,
    Approved,
    Archived,
}

impl MissionStatus {
    /// Parses the wire/CLI spelling of a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "approved" => Some(Self::Approved),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Archived => "archived",
        }
    }
}

/// Header metadata shown on the order sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionMeta {
    pub date: String,
    pub time: String,
    pub location: String,
    pub weather: String,
}

/// Free-text tactical briefing fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticalInfo {
    pub allies: String,
    pub roe: String,
}

/// Normalized photograph payload plus optional caption.
///
/// The `url` holds the full encoded image inline, so an attachment stays
/// portable inside the aggregate's own serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl Attachment {
    /// Wraps encoded JPEG bytes into an inline payload with no caption.
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            url: format!("{INLINE_JPEG_PREFIX}{encoded}"),
            caption: None,
        }
    }

    /// Decodes the inline JPEG payload back to raw bytes.
    ///
    /// Returns `None` when the payload is not an inline JPEG data URL or the
    /// base64 body does not decode.
    pub fn jpeg_bytes(&self) -> Option<Vec<u8>> {
        let body = self.url.strip_prefix(INLINE_JPEG_PREFIX)?;
        base64::engine::general_purpose::STANDARD.decode(body).ok()
    }
}

/// Named coordinate row of the tactical tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateRow {
    pub id: Uuid,
    pub name: String,
    pub mgrs: String,
}

impl CoordinateRow {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            mgrs: String::new(),
        }
    }
}

impl Default for CoordinateRow {
    fn default() -> Self {
        Self::new()
    }
}

/// Radio frequency row of the tactical tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRow {
    pub id: Uuid,
    pub unit: String,
    pub mhz: String,
}

impl FrequencyRow {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            unit: String::new(),
            mhz: String::new(),
        }
    }
}

impl Default for FrequencyRow {
    fn default() -> Self {
        Self::new()
    }
}

/// Sub-section of a briefing section, addressed by alphabetic ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubSection {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub images: Vec<Attachment>,
}

impl SubSection {
    /// Creates an empty sub-section with the default placeholder title.
    pub fn new() -> Self {
        Self::titled("Nouvelle sous-section")
    }

    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: String::new(),
            images: Vec::new(),
        }
    }
}

impl Default for SubSection {
    fn default() -> Self {
        Self::new()
    }
}

/// Numbered briefing section owning ordered sub-sections and photos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub title: String,
    pub subs: Vec<SubSection>,
    #[serde(default)]
    pub images: Vec<Attachment>,
}

impl Section {
    /// Creates a fresh section with one seeded sub-section, as appended by
    /// the section-insert operation.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "NOUVELLE SECTION".to_string(),
            subs: vec![SubSection::titled("Sous-section")],
            images: Vec::new(),
        }
    }

    fn seeded(title: &str, sub_titles: &[&str]) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            subs: sub_titles
                .iter()
                .map(|sub_title| SubSection::titled(*sub_title))
                .collect(),
            images: Vec::new(),
        }
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete mission dossier, the unit of optimistic synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub title: String,
    pub meta: MissionMeta,
    pub tactical: TacticalInfo,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub coords: Vec<CoordinateRow>,
    #[serde(default)]
    pub freqs: Vec<FrequencyRow>,
    #[serde(default)]
    pub images: Vec<Attachment>,
    pub status: MissionStatus,
}

impl Mission {
    /// Creates a new draft dossier seeded with the canonical briefing
    /// skeleton.
    ///
    /// # Contract
    /// - Three sections: SITUATION, MISSION, EXÉCUTION with their canonical
    ///   sub-sections and empty content.
    /// - `meta.date` is today's local date as `DD/MM/YYYY`; time, location
    ///   and weather carry the standard placeholders.
    /// - Tabular rows and annex images start empty; `status` is `Draft`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            meta: MissionMeta {
                date: chrono::Local::now().format("%d/%m/%Y").to_string(),
                time: "0000Z".to_string(),
                location: "---".to_string(),
                weather: "---".to_string(),
            },
            tactical: TacticalInfo::default(),
            sections: vec![
                Section::seeded(
                    "SITUATION",
                    &["Forces ennemies", "Forces amies", "Météo / Terrain"],
                ),
                Section::seeded("MISSION", &["Objectif principal", "Effets à obtenir"]),
                Section::seeded(
                    "EXÉCUTION",
                    &[
                        "Concept de manœuvre",
                        "Missions subordonnées",
                        "Instructions de coordination",
                    ],
                ),
            ],
            coords: Vec::new(),
            freqs: Vec::new(),
            images: Vec::new(),
            status: MissionStatus::Draft,
        }
    }
}

/// 1-based display number for the section at `index`.
pub fn section_ordinal(index: usize) -> usize {
    index + 1
}

/// Alphabetic display ordinal for the sub-section at `index`.
///
/// Restarts at `a` inside every section; positions past `z` render as `?`.
pub fn sub_ordinal(index: usize) -> char {
    if index < 26 {
        (b'a' + index as u8) as char
    } else {
        '?'
    }
}
