//! Catalog and lyrics sources.
//!
//! # Responsibility
//! - Abstract where catalog documents and lyric bodies come from.
//! - Ship a built-in sample catalog for when the real one is unavailable.

pub mod fallback;
pub mod source;
