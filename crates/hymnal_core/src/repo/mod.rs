//! Persistence contracts for annotation slots.
//!
//! # Responsibility
//! - Define a small string-keyed slot storage contract.
//! - Keep SQLite details out of the annotation store.
//!
//! # Invariants
//! - A slot write replaces the slot's whole value.
//! - Reading a slot that was never written returns `None`, not an error.

pub mod slot_repo;
