//! Optimistic local/remote synchronization.
//!
//! # Responsibility
//! - Mirror store mutations to the persistence backend on a best-effort
//!   basis, off the caller's critical path.
//!
//! # Invariants
//! - A failed remote call is logged and never unwinds local state.
//! - No ordering is guaranteed between two rapidly pushed calls for the
//!   same aggregate; the last response to land determines the logged
//!   outcome.

pub mod remote_mirror;

pub use remote_mirror::{RemoteMirror, SyncTask};
