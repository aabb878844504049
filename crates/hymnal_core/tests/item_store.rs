use hymnal_core::{
    CatalogOrigin, Item, ItemStore, SourceError, StaticTextSource, TextSource, BODY_UNAVAILABLE,
};
use serde_json::json;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Counts fetches per reference on top of a static table.
struct CountingSource {
    inner: StaticTextSource,
    fetches: RefCell<BTreeMap<String, usize>>,
}

impl CountingSource {
    fn new(inner: StaticTextSource) -> Self {
        Self {
            inner,
            fetches: RefCell::new(BTreeMap::new()),
        }
    }

    fn fetch_count(&self, reference: &str) -> usize {
        self.fetches.borrow().get(reference).copied().unwrap_or(0)
    }
}

impl TextSource for CountingSource {
    fn fetch_text(&self, reference: &str) -> Result<String, SourceError> {
        *self
            .fetches
            .borrow_mut()
            .entry(reference.to_string())
            .or_default() += 1;
        self.inner.fetch_text(reference)
    }
}

#[test]
fn load_uses_source_catalog_in_document_order() {
    let source = StaticTextSource::new().with(
        "hymns.json",
        json!([
            {"id": 9, "title": "Nine", "audio": "9.mp3"},
            {"id": 2, "title": "Two", "lyricsFile": "lyrics/2.txt", "mood": "calm"}
        ])
        .to_string(),
    );

    let loaded = ItemStore::load(&source, "hymns.json");
    assert!(loaded.warning.is_none());
    let store = loaded.store;
    assert_eq!(store.origin(), CatalogOrigin::Source);
    assert_eq!(
        store.items().iter().map(|item| item.id).collect::<Vec<_>>(),
        vec![9, 2]
    );
    assert_eq!(store.find_by_id(2).unwrap().category.as_deref(), Some("calm"));
    assert!(store.find_by_id(3).is_none());
}

#[test]
fn load_falls_back_on_missing_or_malformed_catalog() {
    let source = StaticTextSource::new()
        .with("object.json", r#"{"hymns": []}"#)
        .with("broken.json", "[{")
        .with("bad-entry.json", r#"[{"id": "one", "title": "x"}]"#)
        .with("dupes.json", r#"[{"id": 1, "title": "a"}, {"id": 1, "title": "b"}]"#);

    let references = [
        "missing.json",
        "object.json",
        "broken.json",
        "bad-entry.json",
        "dupes.json",
    ];
    for reference in references {
        let loaded = ItemStore::load(&source, reference);
        assert_eq!(loaded.store.origin(), CatalogOrigin::Fallback, "{reference}");
        assert!(!loaded.store.is_empty());
        assert!(loaded.warning.is_some(), "{reference}");
    }
}

#[test]
fn body_prefers_inline_then_fetches_reference_once() {
    let lyrics = StaticTextSource::new().with("lyrics/2.txt", "Fetched verse");
    let source = CountingSource::new(lyrics);
    let mut store = ItemStore::from_items(vec![
        Item::new(1, "Inline").with_body("Inline verse").with_body_ref("lyrics/1.txt"),
        Item::new(2, "Referenced").with_body_ref("lyrics/2.txt"),
        Item::new(3, "Missing").with_body_ref("lyrics/3.txt"),
        Item::new(4, "Bare"),
    ]);

    assert_eq!(store.body(1, &source), "Inline verse");
    assert_eq!(source.fetch_count("lyrics/1.txt"), 0);

    assert_eq!(store.cached_body(2), None);
    assert_eq!(store.body(2, &source), "Fetched verse");
    assert_eq!(store.body(2, &source), "Fetched verse");
    assert_eq!(source.fetch_count("lyrics/2.txt"), 1);
    assert_eq!(store.cached_body(2), Some("Fetched verse"));

    assert_eq!(store.body(3, &source), BODY_UNAVAILABLE);
    assert_eq!(store.body(3, &source), BODY_UNAVAILABLE);
    assert_eq!(source.fetch_count("lyrics/3.txt"), 1);
    assert_eq!(store.cached_body(3), None);

    assert_eq!(store.body(4, &source), BODY_UNAVAILABLE);
    assert_eq!(store.body(404, &source), BODY_UNAVAILABLE);
}
