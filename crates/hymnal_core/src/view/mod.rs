//! Derived views over the catalog and annotations.
//!
//! # Responsibility
//! - Project catalog items through a lens (all/favorites/notes/mood).
//! - Reconcile rendered containers against projections.
//!
//! # Invariants
//! - Projections always preserve catalog order.
//! - Each container has exactly one delegated action listener.

pub mod container;
pub mod lens;
pub mod projector;
pub mod render;
