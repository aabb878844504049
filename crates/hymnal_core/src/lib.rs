//! Core domain logic for the hymnal catalog browser.
//! This crate is the single source of truth for annotation invariants and
//! view consistency.

pub mod catalog;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod playback;
pub mod repo;
pub mod service;
pub mod view;

pub use catalog::source::{FsTextSource, SourceError, StaticTextSource, TextSource};
pub use config::BrowserConfig;
pub use logging::{
    default_log_level, init_logging, logging_status, try_init_logging, LogLevel, LoggingError,
};
pub use model::item::{Item, ItemId, Mood, UnknownMood};
pub use model::snapshot::{Snapshot, SNAPSHOT_VERSION};
pub use notify::{Notice, NoticeBoard, NoticeLevel};
pub use playback::{AudioOutput, NullOutput, PlaybackError, PlaybackState, Player};
pub use repo::slot_repo::{
    MemorySlotRepository, RepoError, RepoResult, Slot, SlotRepository, SqliteSlotRepository,
};
pub use service::annotation_store::{
    AnnotationError, AnnotationStore, FieldOutcome, ImportError, ImportReport, LoadReport,
    NoteChange,
};
pub use service::browser::{Browser, OpenedItem, Selection, ViewKind};
pub use service::item_store::{CatalogLoad, CatalogOrigin, ItemStore, BODY_UNAVAILABLE};
pub use view::container::{ActionTag, Card, CardAction, Container, EventTarget, Node};
pub use view::lens::{Lens, LensParseError, MoodFilter};
pub use view::projector::{project, AnnotationView, TextQuery};
pub use view::render::ListRenderer;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
