//! Lens projection and text query matching.

use crate::model::item::{Item, ItemId, Mood};
use crate::model::snapshot::Snapshot;
use crate::repo::slot_repo::SlotRepository;
use crate::service::annotation_store::AnnotationStore;
use crate::service::item_store::ItemStore;
use crate::view::lens::{Lens, MoodFilter};

/// Read access to annotation state needed by projections and cards.
pub trait AnnotationView {
    fn is_favorite(&self, id: ItemId) -> bool;
    fn note(&self, id: ItemId) -> Option<&str>;
    fn mood(&self, id: ItemId) -> Option<Mood>;

    fn has_note(&self, id: ItemId) -> bool {
        self.note(id).is_some()
    }
}

impl<R: SlotRepository> AnnotationView for AnnotationStore<R> {
    fn is_favorite(&self, id: ItemId) -> bool {
        AnnotationStore::is_favorite(self, id)
    }

    fn note(&self, id: ItemId) -> Option<&str> {
        AnnotationStore::note(self, id)
    }

    fn mood(&self, id: ItemId) -> Option<Mood> {
        AnnotationStore::mood(self, id)
    }
}

impl AnnotationView for Snapshot {
    fn is_favorite(&self, id: ItemId) -> bool {
        self.favorites.contains(&id)
    }

    fn note(&self, id: ItemId) -> Option<&str> {
        self.notes
            .get(&id)
            .map(String::as_str)
            .filter(|note| !note.trim().is_empty())
    }

    fn mood(&self, id: ItemId) -> Option<Mood> {
        self.moods.get(&id).copied()
    }
}

/// Normalized free-text query. Empty means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextQuery {
    needle: String,
}

impl TextQuery {
    pub fn new(raw: &str) -> Self {
        Self {
            needle: raw.trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.needle
    }

    /// Matches by exact id, zero-padded id, title or body substring.
    pub fn matches(&self, item: &Item, body: Option<&str>) -> bool {
        if self.is_empty() {
            return true;
        }
        let needle = self.needle.as_str();
        item.id.to_string() == needle
            || item.number_label() == needle
            || item.title.to_lowercase().contains(needle)
            || body.is_some_and(|body| body.to_lowercase().contains(needle))
    }
}

/// Items visible through `lens`, in catalog order.
///
/// `query` narrows only the `All` lens.
pub fn project<'a>(
    lens: Lens,
    query: &TextQuery,
    items: &'a ItemStore,
    annotations: &dyn AnnotationView,
) -> Vec<&'a Item> {
    let keep = |item: &Item| match lens {
        Lens::All => query.matches(item, items.cached_body(item.id)),
        Lens::Favorites => annotations.is_favorite(item.id),
        Lens::Notes => annotations.has_note(item.id),
        Lens::Mood(MoodFilter::Any) => true,
        Lens::Mood(MoodFilter::Only(mood)) => annotations.mood(item.id) == Some(mood),
    };
    items.items().iter().filter(|&item| keep(item)).collect()
}
