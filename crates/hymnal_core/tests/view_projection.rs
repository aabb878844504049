use hymnal_core::{
    project, AnnotationStore, Item, ItemStore, Lens, MemorySlotRepository, Mood, MoodFilter,
    Snapshot, TextQuery,
};
use std::collections::BTreeMap;

fn ids(items: &[&Item]) -> Vec<u32> {
    items.iter().map(|item| item.id).collect()
}

fn catalog() -> ItemStore {
    ItemStore::from_items(vec![
        Item::new(5, "Be Still, My Soul"),
        Item::new(3, "Abide with Me"),
        Item::new(7, "Grace Abounds").with_body("Where sin abounded, grace abounded more"),
        Item::new(1, "Holy, Holy, Holy"),
    ])
}

#[test]
fn mood_lens_returns_matching_items_in_catalog_order() {
    let items = catalog();
    let annotations = Snapshot {
        moods: BTreeMap::from([(3, Mood::Calm), (5, Mood::Calm), (1, Mood::Happy)]),
        ..Snapshot::default()
    };

    let calm = project(
        "mood:calm".parse::<Lens>().unwrap(),
        &TextQuery::default(),
        &items,
        &annotations,
    );
    assert_eq!(ids(&calm), vec![5, 3]);

    let any = project(
        Lens::Mood(MoodFilter::Any),
        &TextQuery::default(),
        &items,
        &annotations,
    );
    assert_eq!(ids(&any), vec![5, 3, 7, 1]);
}

#[test]
fn favorites_and_notes_lenses_follow_catalog_order_and_ignore_stale_ids() {
    let items = catalog();
    let (mut store, _) = AnnotationStore::load_persisted(MemorySlotRepository::new());
    for id in [1, 999, 5] {
        store.toggle_favorite(id).unwrap();
    }
    store.set_note(7, "slow tempo").unwrap();
    store.set_note(42, "stale").unwrap();

    let favorites = project(Lens::Favorites, &TextQuery::default(), &items, &store);
    assert_eq!(ids(&favorites), vec![5, 1]);

    let notes = project(Lens::Notes, &TextQuery::default(), &items, &store);
    assert_eq!(ids(&notes), vec![7]);
}

#[test]
fn query_filters_all_lens_only() {
    let items = catalog();
    let annotations = Snapshot {
        favorites: vec![3],
        ..Snapshot::default()
    };

    let by_padded_id = project(Lens::All, &TextQuery::new("007"), &items, &annotations);
    assert_eq!(ids(&by_padded_id), vec![7]);

    let by_title = project(Lens::All, &TextQuery::new("  GRACE "), &items, &annotations);
    assert_eq!(ids(&by_title), vec![7]);

    let by_body = project(Lens::All, &TextQuery::new("sin abounded"), &items, &annotations);
    assert_eq!(ids(&by_body), vec![7]);

    let nothing = project(Lens::All, &TextQuery::new("9"), &items, &annotations);
    assert!(nothing.is_empty());

    let favorites = project(Lens::Favorites, &TextQuery::new("9"), &items, &annotations);
    assert_eq!(ids(&favorites), vec![3]);
}

#[test]
fn empty_favorites_projects_to_empty_list() {
    let items = ItemStore::from_items(vec![Item::new(1, "A"), Item::new(2, "B")]);
    let projected = project(
        Lens::Favorites,
        &TextQuery::default(),
        &items,
        &Snapshot::default(),
    );
    assert!(projected.is_empty());
}
