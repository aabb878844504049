//! User annotation store: favorites, notes and moods.
//!
//! # Responsibility
//! - Own the three mutable annotation collections and their persistence.
//! - Provide export/import/reset over all collections at once.
//!
//! # Invariants
//! - A note id is present iff its trimmed note is non-empty.
//! - Every mutation writes the whole affected collection before it becomes
//!   visible in memory; a failed write leaves memory unchanged.
//! - Import and reset write all three slots as one batch; a failure leaves
//!   both storage and memory as they were.
//! - Persisted slots load independently: one corrupt slot never blanks
//!   another.
//! - Log events carry ids and counts only, never note text.

use crate::model::item::{ItemId, Mood};
use crate::model::snapshot::{
    parse_favorites, parse_moods, parse_notes, Snapshot, SnapshotFields, SnapshotRejection,
    SNAPSHOT_VERSION,
};
use crate::repo::slot_repo::{RepoError, Slot, SlotRepository};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AnnotationResult<T> = Result<T, AnnotationError>;

/// Failure to persist an annotation collection.
#[derive(Debug)]
pub enum AnnotationError {
    Storage { slot: Slot, source: RepoError },
    /// A whole-store write failed; no slot was changed.
    StorageBatch { source: RepoError },
    Serialize { slot: Slot, source: serde_json::Error },
}

impl Display for AnnotationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage { slot, source } => {
                write!(f, "failed to save {}: {source}", slot.key())
            }
            Self::StorageBatch { source } => write!(f, "failed to save annotations: {source}"),
            Self::Serialize { slot, source } => {
                write!(f, "failed to encode {}: {source}", slot.key())
            }
        }
    }
}

impl Error for AnnotationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage { source, .. } | Self::StorageBatch { source } => Some(source),
            Self::Serialize { source, .. } => Some(source),
        }
    }
}

/// Whole-document import failure. State is untouched in every case.
#[derive(Debug)]
pub enum ImportError {
    /// Not JSON, or not a JSON object at the top level.
    Malformed(String),
    /// Written by a newer exporter.
    UnsupportedVersion(u64),
    /// Valid document, but saving the merged state failed.
    Storage(AnnotationError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(details) => write!(f, "import file is not valid: {details}"),
            Self::UnsupportedVersion(version) => write!(
                f,
                "import file version {version} is newer than supported {SNAPSHOT_VERSION}"
            ),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Malformed(_) | Self::UnsupportedVersion(_) => None,
        }
    }
}

impl From<AnnotationError> for ImportError {
    fn from(value: AnnotationError) -> Self {
        Self::Storage(value)
    }
}

impl From<SnapshotRejection> for ImportError {
    fn from(value: SnapshotRejection) -> Self {
        match value {
            SnapshotRejection::NotJson(details) => Self::Malformed(details),
            SnapshotRejection::NotAnObject => {
                Self::Malformed("top-level value must be an object".to_string())
            }
            SnapshotRejection::InvalidVersion => {
                Self::Malformed("`version` must be a non-negative integer".to_string())
            }
            SnapshotRejection::UnsupportedVersion(version) => Self::UnsupportedVersion(version),
        }
    }
}

/// Outcome of saving a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteChange {
    Saved,
    Cleared,
}

/// Per-field outcome of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOutcome {
    Replaced { entries: usize },
    Kept,
}

impl FieldOutcome {
    pub fn is_replaced(self) -> bool {
        matches!(self, FieldOutcome::Replaced { .. })
    }
}

/// Import summary. Any `Kept` field means the import was partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub version: u32,
    pub favorites: FieldOutcome,
    pub notes: FieldOutcome,
    pub moods: FieldOutcome,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.favorites.is_replaced() && self.notes.is_replaced() && self.moods.is_replaced()
    }
}

/// Slots that were present but unreadable at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub recovered_empty: Vec<Slot>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.recovered_empty.is_empty()
    }
}

/// Annotation collections bound to one slot repository.
pub struct AnnotationStore<R: SlotRepository> {
    repo: R,
    favorites: BTreeSet<ItemId>,
    notes: BTreeMap<ItemId, String>,
    moods: BTreeMap<ItemId, Mood>,
}

impl<R: SlotRepository> AnnotationStore<R> {
    /// Loads all three collections from `repo`.
    ///
    /// Never fails: an unreadable slot becomes an empty collection and is
    /// listed in the returned [`LoadReport`].
    pub fn load_persisted(repo: R) -> (Self, LoadReport) {
        let mut report = LoadReport::default();
        let favorites = load_slot(&repo, Slot::Favorites, parse_favorites, &mut report);
        let notes = load_slot(&repo, Slot::Notes, parse_notes, &mut report);
        let moods = load_slot(&repo, Slot::Moods, parse_moods, &mut report);

        info!(
            "event=annotations_load module=annotation status={} favorites={} notes={} moods={} recovered={}",
            if report.is_clean() { "ok" } else { "degraded" },
            favorites.len(),
            notes.len(),
            moods.len(),
            report.recovered_empty.len()
        );

        (
            Self {
                repo,
                favorites,
                notes,
                moods,
            },
            report,
        )
    }

    pub fn is_favorite(&self, id: ItemId) -> bool {
        self.favorites.contains(&id)
    }

    pub fn note(&self, id: ItemId) -> Option<&str> {
        self.notes.get(&id).map(String::as_str)
    }

    pub fn has_note(&self, id: ItemId) -> bool {
        self.notes.contains_key(&id)
    }

    pub fn mood(&self, id: ItemId) -> Option<Mood> {
        self.moods.get(&id).copied()
    }

    pub fn favorites(&self) -> &BTreeSet<ItemId> {
        &self.favorites
    }

    pub fn notes(&self) -> &BTreeMap<ItemId, String> {
        &self.notes
    }

    pub fn moods(&self) -> &BTreeMap<ItemId, Mood> {
        &self.moods
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Flips favorite membership and returns the new membership.
    pub fn toggle_favorite(&mut self, id: ItemId) -> AnnotationResult<bool> {
        let mut next = self.favorites.clone();
        let is_favorite = if next.remove(&id) {
            false
        } else {
            next.insert(id);
            true
        };
        self.persist(Slot::Favorites, &next)?;
        self.favorites = next;

        info!(
            "event=favorite_toggle module=annotation status=ok item_id={id} favorite={is_favorite} total={}",
            self.favorites.len()
        );
        Ok(is_favorite)
    }

    /// Saves a trimmed note; blank text removes the note instead.
    pub fn set_note(&mut self, id: ItemId, text: &str) -> AnnotationResult<NoteChange> {
        let trimmed = text.trim();
        let mut next = self.notes.clone();
        let change = if trimmed.is_empty() {
            next.remove(&id);
            NoteChange::Cleared
        } else {
            next.insert(id, trimmed.to_string());
            NoteChange::Saved
        };
        self.persist(Slot::Notes, &next)?;
        self.notes = next;

        info!(
            "event=note_save module=annotation status=ok item_id={id} change={change:?} chars={}",
            trimmed.chars().count()
        );
        Ok(change)
    }

    /// Tags an item with a mood, replacing any previous one.
    pub fn set_mood(&mut self, id: ItemId, mood: Mood) -> AnnotationResult<()> {
        let mut next = self.moods.clone();
        next.insert(id, mood);
        self.persist(Slot::Moods, &next)?;
        self.moods = next;

        info!("event=mood_set module=annotation status=ok item_id={id} mood={mood}");
        Ok(())
    }

    /// Removes an item's mood tag. Returns whether one was present.
    pub fn clear_mood(&mut self, id: ItemId) -> AnnotationResult<bool> {
        if !self.moods.contains_key(&id) {
            return Ok(false);
        }
        let mut next = self.moods.clone();
        next.remove(&id);
        self.persist(Slot::Moods, &next)?;
        self.moods = next;

        info!("event=mood_clear module=annotation status=ok item_id={id}");
        Ok(true)
    }

    /// Returns a detached copy of every collection.
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            favorites: self.favorites.iter().copied().collect(),
            notes: self.notes.clone(),
            moods: self.moods.clone(),
        }
    }

    /// Merges an exported document into the store, field by field.
    pub fn import_snapshot(&mut self, raw: &str) -> Result<ImportReport, ImportError> {
        let fields = SnapshotFields::parse(raw).map_err(|rejection| {
            let err = ImportError::from(rejection);
            warn!("event=snapshot_import module=annotation status=error error={err}");
            err
        })?;

        let report = ImportReport {
            version: fields.version,
            favorites: outcome(fields.favorites.as_ref().map(BTreeSet::len)),
            notes: outcome(fields.notes.as_ref().map(BTreeMap::len)),
            moods: outcome(fields.moods.as_ref().map(BTreeMap::len)),
        };

        let favorites = fields.favorites.unwrap_or_else(|| self.favorites.clone());
        let notes = fields.notes.unwrap_or_else(|| self.notes.clone());
        let moods = fields.moods.unwrap_or_else(|| self.moods.clone());
        self.replace_all(favorites, notes, moods)?;

        info!(
            "event=snapshot_import module=annotation status={} version={} favorites={:?} notes={:?} moods={:?}",
            if report.is_complete() { "ok" } else { "partial" },
            report.version,
            report.favorites,
            report.notes,
            report.moods
        );
        Ok(report)
    }

    /// Clears every collection. Callers confirm with the user first.
    pub fn reset_all(&mut self) -> AnnotationResult<()> {
        self.replace_all(BTreeSet::new(), BTreeMap::new(), BTreeMap::new())?;
        info!("event=annotations_reset module=annotation status=ok");
        Ok(())
    }

    fn replace_all(
        &mut self,
        favorites: BTreeSet<ItemId>,
        notes: BTreeMap<ItemId, String>,
        moods: BTreeMap<ItemId, Mood>,
    ) -> AnnotationResult<()> {
        let batch = [
            (Slot::Favorites, encode(Slot::Favorites, &favorites)?),
            (Slot::Notes, encode(Slot::Notes, &notes)?),
            (Slot::Moods, encode(Slot::Moods, &moods)?),
        ];
        self.repo.write_slots(&batch).map_err(|source| {
            error!("event=slot_write module=annotation status=error slot=all error={source}");
            AnnotationError::StorageBatch { source }
        })?;
        self.favorites = favorites;
        self.notes = notes;
        self.moods = moods;
        Ok(())
    }

    fn persist<T: Serialize>(&self, slot: Slot, value: &T) -> AnnotationResult<()> {
        let encoded = encode(slot, value)?;
        self.repo.write_slot(slot, &encoded).map_err(|source| {
            error!(
                "event=slot_write module=annotation status=error slot={} error={source}",
                slot.key()
            );
            AnnotationError::Storage { slot, source }
        })
    }
}

fn encode<T: Serialize>(slot: Slot, value: &T) -> AnnotationResult<String> {
    serde_json::to_string(value).map_err(|source| AnnotationError::Serialize { slot, source })
}

fn outcome(entries: Option<usize>) -> FieldOutcome {
    match entries {
        Some(entries) => FieldOutcome::Replaced { entries },
        None => FieldOutcome::Kept,
    }
}

fn load_slot<R, T>(
    repo: &R,
    slot: Slot,
    parse: impl Fn(&Value) -> Option<T>,
    report: &mut LoadReport,
) -> T
where
    R: SlotRepository,
    T: Default,
{
    let raw = match repo.read_slot(slot) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            warn!(
                "event=slot_read module=annotation status=degraded slot={} error={err}",
                slot.key()
            );
            report.recovered_empty.push(slot);
            return T::default();
        }
    };

    match serde_json::from_str::<Value>(&raw).ok().as_ref().and_then(parse) {
        Some(value) => value,
        None => {
            warn!(
                "event=slot_read module=annotation status=degraded slot={} error_code=slot_corrupt",
                slot.key()
            );
            report.recovered_empty.push(slot);
            T::default()
        }
    }
}
