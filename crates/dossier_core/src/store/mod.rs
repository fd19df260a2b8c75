//! Canonical in-memory mission collection.
//!
//! # Responsibility
//! - Own the authoritative collection of mission aggregates.
//! - Apply every mutation optimistically, then mirror it to the backend.
//!
//! # Invariants
//! - Local mutations complete synchronously before any remote call settles.
//! - Remote failures never roll back local state.

pub mod mission_store;

pub use mission_store::{AttachError, LoadState, MissionStore};
