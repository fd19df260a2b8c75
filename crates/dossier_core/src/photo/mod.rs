//! Photograph ingestion pipeline.
//!
//! # Responsibility
//! - Convert arbitrary raster input into a bounded, compressed, inline JPEG
//!   attachment payload, deterministically.
//!
//! # Invariants
//! - The pipeline holds no state across calls.
//! - A failed run never emits a partial attachment.

pub mod normalizer;

pub use normalizer::{archive_tone, normalize, NormalizeProfile, PhotoError};
