//! Structural editing operations over the mission aggregate.
//!
//! # Responsibility
//! - Provide pure, path-addressed mutations that return fresh aggregates.
//! - Surface invalid paths and out-of-range indices synchronously.
//!
//! # Invariants
//! - The input aggregate is never mutated; callers detect change by equality.
//! - Index arguments address the sequence as it exists at call time.

pub mod engine;

pub use engine::{
    add_coord_row, add_freq_row, apply, attach_image, detach_image, edit_coord_row,
    edit_freq_row, edit_sub_section_content, insert_section, insert_sub_section,
    remove_coord_row, remove_freq_row, remove_section, remove_sub_section, rename_section,
    rename_sub_section, set_caption, set_field, set_scalar, CoordField, EditError, EditOp,
    FieldPath, FreqField, PhotoTarget,
};
