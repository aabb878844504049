//! Core use-case services.
//!
//! # Responsibility
//! - Own catalog and annotation state behind controlled mutators.
//! - Orchestrate stores and views for one browsing session.

pub mod annotation_store;
pub mod browser;
pub mod item_store;
