//! Mission domain model.
//!
//! # Responsibility
//! - Define the canonical aggregate shape every other module reads/writes.
//! - Provide the creation factory and partial-update merge semantics.
//!
//! # Invariants
//! - Every entity is identified by a stable v4 UUID minted at creation.
//! - Sequence fields are never null; an absent sequence is an empty one.
//! - Ordinals are positional and never stored on an entity.

pub mod mission;
pub mod patch;
