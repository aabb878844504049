//! List reconciliation: full replacement and single-card update.

use crate::model::item::Item;
use crate::view::container::{ActionTag, Card, Container, Node};
use crate::view::projector::AnnotationView;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const NOTE_PREVIEW_CHARS: usize = 60;
const DEFAULT_EMPTY_MESSAGE: &str = "No hymns to show.";

/// Builds cards and reconciles containers against projections.
#[derive(Debug, Clone)]
pub struct ListRenderer {
    empty_message: String,
}

impl Default for ListRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_EMPTY_MESSAGE)
    }
}

impl ListRenderer {
    pub fn new(empty_message: impl Into<String>) -> Self {
        Self {
            empty_message: empty_message.into(),
        }
    }

    /// Replaces the whole container with one card per item, or the
    /// empty-state block when `items` is empty.
    pub fn render_full(
        &self,
        items: &[&Item],
        container: &mut Container,
        annotations: &dyn AnnotationView,
    ) {
        let nodes = if items.is_empty() {
            vec![Node::Empty {
                message: self.empty_message.clone(),
            }]
        } else {
            items
                .iter()
                .map(|item| Node::Card(build_card(item, annotations)))
                .collect()
        };
        debug!(
            "event=render_full module=view container={} cards={}",
            container.name(),
            items.len()
        );
        container.replace_all(nodes);
    }

    /// Rebuilds the card for `item` in place.
    ///
    /// Returns `false` (and changes nothing) when the container does not
    /// display that item.
    pub fn render_one(
        &self,
        item: &Item,
        container: &mut Container,
        annotations: &dyn AnnotationView,
    ) -> bool {
        if container.card(item.id).is_none() {
            return false;
        }
        let replaced = container.replace_card(build_card(item, annotations));
        debug!(
            "event=render_one module=view container={} item_id={} replaced={replaced}",
            container.name(),
            item.id
        );
        replaced
    }
}

/// Builds a card reflecting current annotation state.
pub fn build_card(item: &Item, annotations: &dyn AnnotationView) -> Card {
    Card {
        item_id: item.id,
        number: item.number_label(),
        title: item.title.clone(),
        favorite: annotations.is_favorite(item.id),
        mood: annotations.mood(item.id),
        note_preview: annotations.note(item.id).map(note_preview),
        actions: ActionTag::CARD_ACTIONS,
    }
}

/// One-line note preview: whitespace collapsed, length capped.
pub fn note_preview(note: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(note.trim(), " ");
    let mut preview = collapsed.chars().take(NOTE_PREVIEW_CHARS).collect::<String>();
    if collapsed.chars().count() > NOTE_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::note_preview;

    #[test]
    fn note_preview_collapses_whitespace_and_truncates() {
        assert_eq!(note_preview("  sing\n\n  softly\tnow "), "sing softly now");
        let long = "word ".repeat(40);
        let preview = note_preview(&long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 63);
    }
}
