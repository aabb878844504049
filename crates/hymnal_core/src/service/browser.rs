//! Catalog browser session.
//!
//! # Responsibility
//! - Own the stores, the per-view containers, playback and notices.
//! - Route user actions to the stores and re-render only affected views.
//!
//! # Invariants
//! - Every failure becomes a notice; no operation here returns a panic or
//!   leaves a view out of sync with the stores.
//! - A mutation re-renders in full only the view whose membership can change;
//!   other views get an in-place card update.

use crate::catalog::source::TextSource;
use crate::model::item::{Item, ItemId, Mood};
use crate::model::snapshot::Snapshot;
use crate::notify::{NoticeBoard, NoticeLevel};
use crate::playback::{AudioOutput, PlaybackState, Player};
use crate::repo::slot_repo::SlotRepository;
use crate::service::annotation_store::{AnnotationStore, ImportError, ImportReport, NoteChange};
use crate::service::item_store::ItemStore;
use crate::view::container::{ActionTag, CardAction, Container, EventTarget};
use crate::view::lens::{Lens, MoodFilter};
use crate::view::projector::{project, TextQuery};
use crate::view::render::ListRenderer;
use log::info;

/// The four lists a shell displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ViewKind {
    All,
    Favorites,
    Notes,
    Mood,
}

impl ViewKind {
    pub const ALL: [ViewKind; 4] = [
        ViewKind::All,
        ViewKind::Favorites,
        ViewKind::Notes,
        ViewKind::Mood,
    ];

    fn container_name(self) -> &'static str {
        match self {
            ViewKind::All => "all",
            ViewKind::Favorites => "favorites",
            ViewKind::Notes => "notes",
            ViewKind::Mood => "mood",
        }
    }
}

/// Annotation mutation that views must reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Favorite(ItemId),
    Note(ItemId),
    Mood(ItemId),
    Everything,
}

/// Views to rebuild for a change: `full` re-renders, `targeted` card updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshPlan {
    pub full: Vec<ViewKind>,
    pub targeted: Vec<ViewKind>,
}

/// Decides which views a change touches and how.
pub fn refresh_plan(change: Change, mood_filter: MoodFilter) -> RefreshPlan {
    let membership_view = match change {
        Change::Everything => {
            return RefreshPlan {
                full: ViewKind::ALL.to_vec(),
                targeted: Vec::new(),
            }
        }
        Change::Favorite(_) => Some(ViewKind::Favorites),
        Change::Note(_) => Some(ViewKind::Notes),
        Change::Mood(_) => match mood_filter {
            MoodFilter::Only(_) => Some(ViewKind::Mood),
            MoodFilter::Any => None,
        },
    };
    let (full, targeted): (Vec<ViewKind>, Vec<ViewKind>) = ViewKind::ALL
        .into_iter()
        .partition(|view| Some(*view) == membership_view);
    RefreshPlan { full, targeted }
}

/// Transient UI selection. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub open_item: Option<ItemId>,
    pub mood_filter: MoodFilter,
}

/// Detail of the currently open item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedItem {
    pub item: Item,
    pub body: String,
    pub favorite: bool,
    pub note: Option<String>,
    pub mood: Option<Mood>,
}

struct Views {
    all: Container,
    favorites: Container,
    notes: Container,
    mood: Container,
}

impl Views {
    fn new() -> Self {
        Self {
            all: Container::new(ViewKind::All.container_name()),
            favorites: Container::new(ViewKind::Favorites.container_name()),
            notes: Container::new(ViewKind::Notes.container_name()),
            mood: Container::new(ViewKind::Mood.container_name()),
        }
    }

    fn get(&self, kind: ViewKind) -> &Container {
        match kind {
            ViewKind::All => &self.all,
            ViewKind::Favorites => &self.favorites,
            ViewKind::Notes => &self.notes,
            ViewKind::Mood => &self.mood,
        }
    }

    fn get_mut(&mut self, kind: ViewKind) -> &mut Container {
        match kind {
            ViewKind::All => &mut self.all,
            ViewKind::Favorites => &mut self.favorites,
            ViewKind::Notes => &mut self.notes,
            ViewKind::Mood => &mut self.mood,
        }
    }
}

/// One browsing session over a catalog and an annotation repository.
pub struct Browser<R: SlotRepository, O: AudioOutput> {
    items: ItemStore,
    annotations: AnnotationStore<R>,
    source: Box<dyn TextSource>,
    player: Player<O>,
    notices: NoticeBoard,
    renderer: ListRenderer,
    selection: Selection,
    query: TextQuery,
    views: Views,
}

impl<R: SlotRepository, O: AudioOutput> Browser<R, O> {
    /// Loads the catalog and annotations, then renders every view.
    pub fn start(source: Box<dyn TextSource>, catalog_ref: &str, repo: R, output: O) -> Self {
        let mut notices = NoticeBoard::default();

        let loaded = ItemStore::load(source.as_ref(), catalog_ref);
        if let Some(warning) = loaded.warning {
            notices.push(NoticeLevel::Warning, warning);
        }

        let (annotations, report) = AnnotationStore::load_persisted(repo);
        if !report.is_clean() {
            let slots = report
                .recovered_empty
                .iter()
                .map(|slot| slot.key())
                .collect::<Vec<_>>()
                .join(", ");
            notices.push(
                NoticeLevel::Warning,
                format!("Some saved data could not be read and was reset: {slots}."),
            );
        }

        let mut browser = Self {
            items: loaded.store,
            annotations,
            source,
            player: Player::new(output),
            notices,
            renderer: ListRenderer::default(),
            selection: Selection::default(),
            query: TextQuery::default(),
            views: Views::new(),
        };
        browser.apply(Change::Everything);
        info!(
            "event=browser_start module=browser status=ok items={}",
            browser.items.len()
        );
        browser
    }

    pub fn items(&self) -> &ItemStore {
        &self.items
    }

    pub fn annotations(&self) -> &AnnotationStore<R> {
        &self.annotations
    }

    pub fn container(&self, kind: ViewKind) -> &Container {
        self.views.get(kind)
    }

    /// Installs the delegated listener of one view's container.
    pub fn on_action(&mut self, kind: ViewKind, listener: impl FnMut(CardAction) + 'static) {
        self.views.get_mut(kind).on_action(listener);
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }

    pub fn player(&self) -> &Player<O> {
        &self.player
    }

    pub fn lens(&self, kind: ViewKind) -> Lens {
        match kind {
            ViewKind::All => Lens::All,
            ViewKind::Favorites => Lens::Favorites,
            ViewKind::Notes => Lens::Notes,
            ViewKind::Mood => Lens::Mood(self.selection.mood_filter),
        }
    }

    /// Items currently visible through `lens` (query applies to `All`).
    pub fn project(&self, lens: Lens) -> Vec<&Item> {
        project(lens, &self.query, &self.items, &self.annotations)
    }

    /// Opens an item, fetching its lyrics on first open.
    pub fn open_item(&mut self, id: ItemId) -> Option<OpenedItem> {
        let item = self.items.find_by_id(id)?.clone();
        let had_body = self.items.cached_body(id).is_some();
        let body = self.items.body(id, self.source.as_ref());
        self.selection.open_item = Some(id);

        // Newly fetched lyrics can change which items the query matches.
        if !had_body && !self.query.is_empty() {
            self.render_full(ViewKind::All);
        }

        Some(OpenedItem {
            body,
            favorite: self.annotations.is_favorite(id),
            note: self.annotations.note(id).map(str::to_string),
            mood: self.annotations.mood(id),
            item,
        })
    }

    pub fn close_item(&mut self) {
        self.selection.open_item = None;
    }

    /// Returns the new membership, or `None` if saving failed.
    pub fn toggle_favorite(&mut self, id: ItemId) -> Option<bool> {
        match self.annotations.toggle_favorite(id) {
            Ok(is_favorite) => {
                self.apply(Change::Favorite(id));
                Some(is_favorite)
            }
            Err(err) => {
                self.notices.push(NoticeLevel::Error, err.to_string());
                None
            }
        }
    }

    pub fn save_note(&mut self, id: ItemId, text: &str) -> Option<NoteChange> {
        match self.annotations.set_note(id, text) {
            Ok(change) => {
                self.apply(Change::Note(id));
                let message = match change {
                    NoteChange::Saved => "Note saved.",
                    NoteChange::Cleared => "Note cleared.",
                };
                self.notices.push(NoticeLevel::Info, message);
                Some(change)
            }
            Err(err) => {
                self.notices.push(NoticeLevel::Error, err.to_string());
                None
            }
        }
    }

    /// Tags an item with a mood label from the fixed vocabulary.
    pub fn set_mood(&mut self, id: ItemId, label: &str) -> bool {
        let mood = match label.parse::<Mood>() {
            Ok(mood) => mood,
            Err(err) => {
                self.notices.push(NoticeLevel::Error, err.to_string());
                return false;
            }
        };
        match self.annotations.set_mood(id, mood) {
            Ok(()) => {
                self.apply(Change::Mood(id));
                true
            }
            Err(err) => {
                self.notices.push(NoticeLevel::Error, err.to_string());
                false
            }
        }
    }

    pub fn clear_mood(&mut self, id: ItemId) -> bool {
        match self.annotations.clear_mood(id) {
            Ok(removed) => {
                if removed {
                    self.apply(Change::Mood(id));
                }
                removed
            }
            Err(err) => {
                self.notices.push(NoticeLevel::Error, err.to_string());
                false
            }
        }
    }

    pub fn select_mood_filter(&mut self, filter: MoodFilter) {
        if self.selection.mood_filter != filter {
            self.selection.mood_filter = filter;
            self.render_full(ViewKind::Mood);
        }
    }

    pub fn set_query(&mut self, raw: &str) {
        let query = TextQuery::new(raw);
        if query != self.query {
            self.query = query;
            self.render_full(ViewKind::All);
        }
    }

    /// Handles a click delivered to one view's container.
    pub fn dispatch(&mut self, kind: ViewKind, target: EventTarget<'_>) -> Option<CardAction> {
        let action = self.views.get_mut(kind).click(target)?;
        match action.action {
            ActionTag::ToggleFavorite => {
                self.toggle_favorite(action.item_id);
            }
            ActionTag::Play => {
                self.play(action.item_id);
            }
        }
        Some(action)
    }

    /// Plays an item's audio. Returns whether playback started.
    pub fn play(&mut self, id: ItemId) -> bool {
        let Some(item) = self.items.find_by_id(id) else {
            return false;
        };
        match self.player.play(&item.audio_ref) {
            Ok(()) => true,
            Err(err) => {
                self.notices.push(NoticeLevel::Error, err.to_string());
                false
            }
        }
    }

    pub fn pause(&mut self) {
        self.player.pause();
    }

    pub fn seek(&mut self, position_ms: i64) {
        self.player.seek(position_ms);
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.player.state()
    }

    pub fn export_snapshot(&self) -> Snapshot {
        self.annotations.export_snapshot()
    }

    /// Pretty-printed export document.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.annotations.export_snapshot())
    }

    pub fn import_json(&mut self, raw: &str) -> Result<ImportReport, ImportError> {
        match self.annotations.import_snapshot(raw) {
            Ok(report) => {
                self.apply(Change::Everything);
                if report.is_complete() {
                    self.notices.push(NoticeLevel::Info, "Import complete.");
                } else {
                    self.notices.push(
                        NoticeLevel::Warning,
                        "Import applied; fields that were missing or invalid were kept.",
                    );
                }
                Ok(report)
            }
            Err(err) => {
                self.notices
                    .push(NoticeLevel::Error, format!("Import failed: {err}"));
                Err(err)
            }
        }
    }

    /// Clears all annotations. Does nothing unless `confirmed`.
    pub fn reset_all(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        match self.annotations.reset_all() {
            Ok(()) => {
                self.apply(Change::Everything);
                self.notices.push(NoticeLevel::Info, "All favorites, notes and moods cleared.");
                true
            }
            Err(err) => {
                self.notices.push(NoticeLevel::Error, err.to_string());
                false
            }
        }
    }

    fn apply(&mut self, change: Change) {
        let plan = refresh_plan(change, self.selection.mood_filter);
        for kind in plan.full {
            self.render_full(kind);
        }
        let id = match change {
            Change::Favorite(id) | Change::Note(id) | Change::Mood(id) => id,
            Change::Everything => return,
        };
        for kind in plan.targeted {
            self.render_one(kind, id);
        }
    }

    fn render_full(&mut self, kind: ViewKind) {
        let lens = self.lens(kind);
        let projected = project(lens, &self.query, &self.items, &self.annotations);
        self.renderer
            .render_full(&projected, self.views.get_mut(kind), &self.annotations);
    }

    fn render_one(&mut self, kind: ViewKind, id: ItemId) {
        if let Some(item) = self.items.find_by_id(id) {
            self.renderer
                .render_one(item, self.views.get_mut(kind), &self.annotations);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{refresh_plan, Change, ViewKind};
    use crate::model::item::Mood;
    use crate::view::lens::MoodFilter;

    #[test]
    fn favorite_change_rebuilds_only_favorites_view() {
        let plan = refresh_plan(Change::Favorite(3), MoodFilter::Any);
        assert_eq!(plan.full, vec![ViewKind::Favorites]);
        assert_eq!(
            plan.targeted,
            vec![ViewKind::All, ViewKind::Notes, ViewKind::Mood]
        );
    }

    #[test]
    fn mood_change_rebuilds_mood_view_only_when_filtered() {
        let unfiltered = refresh_plan(Change::Mood(3), MoodFilter::Any);
        assert!(unfiltered.full.is_empty());
        assert_eq!(unfiltered.targeted.len(), 4);

        let filtered = refresh_plan(Change::Mood(3), MoodFilter::Only(Mood::Calm));
        assert_eq!(filtered.full, vec![ViewKind::Mood]);
    }

    #[test]
    fn everything_rebuilds_all_views() {
        let plan = refresh_plan(Change::Everything, MoodFilter::Any);
        assert_eq!(plan.full, ViewKind::ALL.to_vec());
        assert!(plan.targeted.is_empty());
    }
}
