//! Flutter-facing bindings for `hymnal_core`.

pub mod api;
