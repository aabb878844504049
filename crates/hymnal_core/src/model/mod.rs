//! Domain model for the hymn catalog and its user annotations.
//!
//! # Responsibility
//! - Define catalog records and the fixed mood vocabulary.
//! - Define the versioned export/import snapshot shape.
//!
//! # Invariants
//! - Every catalog item is identified by a stable numeric `ItemId`.
//! - Author-assigned `Item::category` and user-assigned moods never share storage.

pub mod item;
pub mod snapshot;
