//! Pure mutation engine for mission aggregates.
//!
//! Every operation clones the incoming aggregate, edits the clone and returns
//! it; the previous value stays valid, which keeps change detection a cheap
//! equality check for callers holding the old aggregate.

use crate::model::mission::{
    Attachment, CoordinateRow, FrequencyRow, Mission, MissionStatus, Section, SubSection,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EditResult = Result<Mission, EditError>;

/// Errors raised by structural editing operations.
///
/// Both variants are synchronous and recoverable; the caller re-validates its
/// paths or indices and retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The field path does not resolve to a known scalar, or the scalar does
    /// not accept the supplied value.
    InvalidPath(String),
    /// An index argument does not address an existing element.
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

impl Display for EditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath(message) => write!(f, "invalid field path: {message}"),
            Self::IndexOutOfRange { what, index, len } => {
                write!(f, "{what} index {index} out of range (len {len})")
            }
        }
    }
}

impl Error for EditError {}

/// Scalar leaves addressable by [`set_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    Title,
    MetaDate,
    MetaTime,
    MetaLocation,
    MetaWeather,
    TacticalAllies,
    TacticalRoe,
    Status,
}

impl FieldPath {
    /// Resolves a dotted path string to a known scalar leaf.
    pub fn parse(path: &str) -> Result<Self, EditError> {
        match path {
            "title" => Ok(Self::Title),
            "meta.date" => Ok(Self::MetaDate),
            "meta.time" => Ok(Self::MetaTime),
            "meta.location" => Ok(Self::MetaLocation),
            "meta.weather" => Ok(Self::MetaWeather),
            "tactical.allies" => Ok(Self::TacticalAllies),
            "tactical.roe" => Ok(Self::TacticalRoe),
            "status" => Ok(Self::Status),
            other => Err(EditError::InvalidPath(format!(
                "`{other}` does not resolve to a known scalar"
            ))),
        }
    }
}

/// Addresses the image sequence an attachment operation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoTarget {
    /// The mission-level annex gallery.
    Mission,
    /// A section's own image strip.
    Section { section: usize },
    /// An image strip inside one sub-section.
    SubSection { section: usize, sub: usize },
}

/// Columns of a coordinate row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordField {
    Name,
    Mgrs,
}

/// Columns of a frequency row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreqField {
    Unit,
    Mhz,
}

/// Replaces the scalar leaf addressed by a dotted `path` string.
pub fn set_field(mission: &Mission, path: &str, value: &str) -> EditResult {
    set_scalar(mission, FieldPath::parse(path)?, value)
}

/// Replaces the scalar leaf addressed by an already-resolved [`FieldPath`].
pub fn set_scalar(mission: &Mission, field: FieldPath, value: &str) -> EditResult {
    let mut next = mission.clone();
    match field {
        FieldPath::Title => next.title = value.to_string(),
        FieldPath::MetaDate => next.meta.date = value.to_string(),
        FieldPath::MetaTime => next.meta.time = value.to_string(),
        FieldPath::MetaLocation => next.meta.location = value.to_string(),
        FieldPath::MetaWeather => next.meta.weather = value.to_string(),
        FieldPath::TacticalAllies => next.tactical.allies = value.to_string(),
        FieldPath::TacticalRoe => next.tactical.roe = value.to_string(),
        FieldPath::Status => {
            next.status = MissionStatus::parse(value).ok_or_else(|| {
                EditError::InvalidPath(format!(
                    "`status` does not accept `{value}`; expected draft|approved|archived"
                ))
            })?;
        }
    }
    Ok(next)
}

/// Appends a new section with one seeded sub-section. Always succeeds.
pub fn insert_section(mission: &Mission) -> Mission {
    let mut next = mission.clone();
    next.sections.push(Section::new());
    next
}

/// Removes the section at `section`; later sections shift down one ordinal.
pub fn remove_section(mission: &Mission, section: usize) -> EditResult {
    let mut next = mission.clone();
    check_index("section", section, next.sections.len())?;
    next.sections.remove(section);
    Ok(next)
}

/// Replaces a section title. Empty titles are permitted and render empty.
pub fn rename_section(mission: &Mission, section: usize, title: &str) -> EditResult {
    let mut next = mission.clone();
    section_mut(&mut next, section)?.title = title.to_string();
    Ok(next)
}

/// Appends a new sub-section to the section at `section`.
pub fn insert_sub_section(mission: &Mission, section: usize) -> EditResult {
    let mut next = mission.clone();
    section_mut(&mut next, section)?.subs.push(SubSection::new());
    Ok(next)
}

/// Removes the sub-section at `(section, sub)`.
pub fn remove_sub_section(mission: &Mission, section: usize, sub: usize) -> EditResult {
    let mut next = mission.clone();
    let owner = section_mut(&mut next, section)?;
    check_index("sub-section", sub, owner.subs.len())?;
    owner.subs.remove(sub);
    Ok(next)
}

/// Replaces a sub-section title. Empty titles are permitted.
pub fn rename_sub_section(
    mission: &Mission,
    section: usize,
    sub: usize,
    title: &str,
) -> EditResult {
    let mut next = mission.clone();
    sub_section_mut(&mut next, section, sub)?.title = title.to_string();
    Ok(next)
}

/// Replaces the free-text content of a sub-section.
pub fn edit_sub_section_content(
    mission: &Mission,
    section: usize,
    sub: usize,
    text: &str,
) -> EditResult {
    let mut next = mission.clone();
    sub_section_mut(&mut next, section, sub)?.content = text.to_string();
    Ok(next)
}

/// Appends an already-normalized attachment to the targeted image sequence.
pub fn attach_image(mission: &Mission, target: PhotoTarget, attachment: Attachment) -> EditResult {
    let mut next = mission.clone();
    images_mut(&mut next, target)?.push(attachment);
    Ok(next)
}

/// Removes the attachment at `index` from the targeted image sequence.
pub fn detach_image(mission: &Mission, target: PhotoTarget, index: usize) -> EditResult {
    let mut next = mission.clone();
    let images = images_mut(&mut next, target)?;
    check_index("image", index, images.len())?;
    images.remove(index);
    Ok(next)
}

/// Replaces the caption of the attachment at `index`.
pub fn set_caption(
    mission: &Mission,
    target: PhotoTarget,
    index: usize,
    caption: &str,
) -> EditResult {
    let mut next = mission.clone();
    let images = images_mut(&mut next, target)?;
    row_mut(images, index, "image")?.caption = Some(caption.to_string());
    Ok(next)
}

/// Appends an empty coordinate row with a freshly minted id.
pub fn add_coord_row(mission: &Mission) -> Mission {
    let mut next = mission.clone();
    next.coords.push(CoordinateRow::new());
    next
}

/// Removes the coordinate row at `index`.
pub fn remove_coord_row(mission: &Mission, index: usize) -> EditResult {
    let mut next = mission.clone();
    remove_row(&mut next.coords, index, "coordinate row")?;
    Ok(next)
}

/// Replaces one column of the coordinate row at `index`.
pub fn edit_coord_row(
    mission: &Mission,
    index: usize,
    field: CoordField,
    value: &str,
) -> EditResult {
    let mut next = mission.clone();
    let row = row_mut(&mut next.coords, index, "coordinate row")?;
    match field {
        CoordField::Name => row.name = value.to_string(),
        CoordField::Mgrs => row.mgrs = value.to_string(),
    }
    Ok(next)
}

/// Appends an empty frequency row with a freshly minted id.
pub fn add_freq_row(mission: &Mission) -> Mission {
    let mut next = mission.clone();
    next.freqs.push(FrequencyRow::new());
    next
}

/// Removes the frequency row at `index`.
pub fn remove_freq_row(mission: &Mission, index: usize) -> EditResult {
    let mut next = mission.clone();
    remove_row(&mut next.freqs, index, "frequency row")?;
    Ok(next)
}

/// Replaces one column of the frequency row at `index`.
pub fn edit_freq_row(mission: &Mission, index: usize, field: FreqField, value: &str) -> EditResult {
    let mut next = mission.clone();
    let row = row_mut(&mut next.freqs, index, "frequency row")?;
    match field {
        FreqField::Unit => row.unit = value.to_string(),
        FreqField::Mhz => row.mhz = value.to_string(),
    }
    Ok(next)
}

/// Typed command covering every engine operation.
///
/// The store applies these through [`apply`] so one entry point carries all
/// structural edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    SetField { field: FieldPath, value: String },
    InsertSection,
    RemoveSection { section: usize },
    RenameSection { section: usize, title: String },
    InsertSubSection { section: usize },
    RemoveSubSection { section: usize, sub: usize },
    RenameSubSection { section: usize, sub: usize, title: String },
    EditContent { section: usize, sub: usize, text: String },
    AttachImage { target: PhotoTarget, attachment: Attachment },
    DetachImage { target: PhotoTarget, index: usize },
    SetCaption { target: PhotoTarget, index: usize, caption: String },
    AddCoordRow,
    RemoveCoordRow { index: usize },
    EditCoordRow { index: usize, field: CoordField, value: String },
    AddFreqRow,
    RemoveFreqRow { index: usize },
    EditFreqRow { index: usize, field: FreqField, value: String },
}

/// Applies one typed operation and returns the resulting aggregate.
pub fn apply(mission: &Mission, op: &EditOp) -> EditResult {
    match op {
        EditOp::SetField { field, value } => set_scalar(mission, *field, value),
        EditOp::InsertSection => Ok(insert_section(mission)),
        EditOp::RemoveSection { section } => remove_section(mission, *section),
        EditOp::RenameSection { section, title } => rename_section(mission, *section, title),
        EditOp::InsertSubSection { section } => insert_sub_section(mission, *section),
        EditOp::RemoveSubSection { section, sub } => remove_sub_section(mission, *section, *sub),
        EditOp::RenameSubSection { section, sub, title } => {
            rename_sub_section(mission, *section, *sub, title)
        }
        EditOp::EditContent { section, sub, text } => {
            edit_sub_section_content(mission, *section, *sub, text)
        }
        EditOp::AttachImage { target, attachment } => {
            attach_image(mission, *target, attachment.clone())
        }
        EditOp::DetachImage { target, index } => detach_image(mission, *target, *index),
        EditOp::SetCaption {
            target,
            index,
            caption,
        } => set_caption(mission, *target, *index, caption),
        EditOp::AddCoordRow => Ok(add_coord_row(mission)),
        EditOp::RemoveCoordRow { index } => remove_coord_row(mission, *index),
        EditOp::EditCoordRow { index, field, value } => {
            edit_coord_row(mission, *index, *field, value)
        }
        EditOp::AddFreqRow => Ok(add_freq_row(mission)),
        EditOp::RemoveFreqRow { index } => remove_freq_row(mission, *index),
        EditOp::EditFreqRow { index, field, value } => edit_freq_row(mission, *index, *field, value),
    }
}

fn check_index(what: &'static str, index: usize, len: usize) -> Result<(), EditError> {
    if index < len {
        Ok(())
    } else {
        Err(EditError::IndexOutOfRange { what, index, len })
    }
}

fn section_mut<'a>(mission: &'a mut Mission, section: usize) -> Result<&'a mut Section, EditError> {
    let len = mission.sections.len();
    mission
        .sections
        .get_mut(section)
        .ok_or(EditError::IndexOutOfRange {
            what: "section",
            index: section,
            len,
        })
}

fn sub_section_mut<'a>(
    mission: &'a mut Mission,
    section: usize,
    sub: usize,
) -> Result<&'a mut SubSection, EditError> {
    let owner = section_mut(mission, section)?;
    let len = owner.subs.len();
    owner.subs.get_mut(sub).ok_or(EditError::IndexOutOfRange {
        what: "sub-section",
        index: sub,
        len,
    })
}

fn images_mut<'a>(
    mission: &'a mut Mission,
    target: PhotoTarget,
) -> Result<&'a mut Vec<Attachment>, EditError> {
    match target {
        PhotoTarget::Mission => Ok(&mut mission.images),
        PhotoTarget::Section { section } => Ok(&mut section_mut(mission, section)?.images),
        PhotoTarget::SubSection { section, sub } => {
            Ok(&mut sub_section_mut(mission, section, sub)?.images)
        }
    }
}

fn row_mut<'a, T>(
    rows: &'a mut [T],
    index: usize,
    what: &'static str,
) -> Result<&'a mut T, EditError> {
    let len = rows.len();
    rows.get_mut(index).ok_or(EditError::IndexOutOfRange {
        what,
        index,
        len,
    })
}

fn remove_row<T>(rows: &mut Vec<T>, index: usize, what: &'static str) -> Result<(), EditError> {
    check_index(what, index, rows.len())?;
    rows.remove(index);
    Ok(())
}
