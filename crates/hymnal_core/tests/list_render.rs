use hymnal_core::{
    project, ActionTag, CardAction, Container, EventTarget, Item, ItemStore, Lens, ListRenderer,
    Mood, Node, Snapshot, TextQuery,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

fn catalog() -> ItemStore {
    ItemStore::from_items(vec![Item::new(1, "A"), Item::new(2, "B")])
}

#[test]
fn empty_favorites_renders_empty_state_block() {
    let items = catalog();
    let annotations = Snapshot::default();
    let projected = project(Lens::Favorites, &TextQuery::default(), &items, &annotations);

    let mut container = Container::new("favorites");
    ListRenderer::default().render_full(&projected, &mut container, &annotations);

    assert!(projected.is_empty());
    assert!(container.is_showing_empty_state());
    assert!(container.to_html().contains("empty-state"));
}

#[test]
fn render_full_replaces_content_in_given_order() {
    let items = catalog();
    let annotations = Snapshot {
        favorites: vec![2],
        ..Snapshot::default()
    };
    let renderer = ListRenderer::default();
    let mut container = Container::new("all");

    renderer.render_full(&[], &mut container, &annotations);
    assert!(container.is_showing_empty_state());

    let reversed = items.items().iter().rev().collect::<Vec<_>>();
    renderer.render_full(&reversed, &mut container, &annotations);
    assert_eq!(container.displayed_ids(), vec![2, 1]);
    assert!(!container.is_showing_empty_state());
    assert!(container.card(2).unwrap().favorite);
    assert!(!container.card(1).unwrap().favorite);
    assert_eq!(container.full_renders(), 2);
}

#[test]
fn render_one_replaces_only_the_matching_card() {
    let items = catalog();
    let mut annotations = Snapshot::default();
    let renderer = ListRenderer::default();
    let mut container = Container::new("all");
    let all = items.items().iter().collect::<Vec<_>>();
    renderer.render_full(&all, &mut container, &annotations);
    let untouched = container.card(1).cloned();

    annotations.favorites.push(2);
    annotations.notes = BTreeMap::from([(2, "  slow\n tempo ".to_string())]);
    annotations.moods = BTreeMap::from([(2, Mood::Reflective)]);
    let item = items.find_by_id(2).unwrap();
    assert!(renderer.render_one(item, &mut container, &annotations));

    let card = container.card(2).unwrap();
    assert!(card.favorite);
    assert_eq!(card.note_preview.as_deref(), Some("slow tempo"));
    assert_eq!(card.mood, Some(Mood::Reflective));
    assert_eq!(container.card(1).cloned(), untouched);
    assert_eq!(container.displayed_ids(), vec![1, 2]);
    assert_eq!(container.full_renders(), 1);
    assert_eq!(container.card_updates(), 1);
}

#[test]
fn render_one_is_a_no_op_when_item_is_not_displayed() {
    let items = catalog();
    let annotations = Snapshot::default();
    let renderer = ListRenderer::default();
    let mut container = Container::new("favorites");
    renderer.render_full(&[], &mut container, &annotations);

    let item = items.find_by_id(1).unwrap();
    assert!(!renderer.render_one(item, &mut container, &annotations));
    assert!(container.is_showing_empty_state());
    assert_eq!(container.card_updates(), 0);
    assert!(matches!(container.nodes(), [Node::Empty { .. }]));
}

#[test]
fn delegated_listener_survives_rerenders_without_duplication() {
    let items = catalog();
    let annotations = Snapshot::default();
    let renderer = ListRenderer::default();
    let mut container = Container::new("all");
    let received = Rc::new(RefCell::new(Vec::<CardAction>::new()));
    let sink = Rc::clone(&received);
    container.on_action(move |action| sink.borrow_mut().push(action));

    let all = items.items().iter().collect::<Vec<_>>();
    for _ in 0..5 {
        renderer.render_full(&all, &mut container, &annotations);
    }
    renderer.render_one(items.find_by_id(1).unwrap(), &mut container, &annotations);

    let resolved = container.click(EventTarget::new("toggle-favorite", "2"));
    assert_eq!(
        resolved,
        Some(CardAction {
            action: ActionTag::ToggleFavorite,
            item_id: 2
        })
    );
    container.click(EventTarget::new("play", "1"));

    assert_eq!(received.borrow().len(), 2);
    assert_eq!(received.borrow()[1].action, ActionTag::Play);
}

#[test]
fn clicks_without_action_or_on_undisplayed_ids_are_ignored() {
    let items = catalog();
    let annotations = Snapshot::default();
    let mut container = Container::new("all");
    let all = items.items().iter().collect::<Vec<_>>();
    ListRenderer::default().render_full(&all, &mut container, &annotations);

    assert_eq!(container.click(EventTarget::default()), None);
    assert_eq!(container.click(EventTarget::new("delete", "1")), None);
    assert_eq!(container.click(EventTarget::new("play", "abc")), None);
    assert_eq!(container.click(EventTarget::new("play", "3")), None);
}

#[test]
fn html_cards_carry_id_and_action_attributes() {
    let items = ItemStore::from_items(vec![Item::new(7, "Grace <Abounds>")]);
    let annotations = Snapshot {
        favorites: vec![7],
        ..Snapshot::default()
    };
    let mut container = Container::new("all");
    let all = items.items().iter().collect::<Vec<_>>();
    ListRenderer::default().render_full(&all, &mut container, &annotations);

    let html = container.to_html();
    assert!(html.contains("class=\"card favorite\" data-id=\"7\""));
    assert!(html.contains("data-action=\"toggle-favorite\" data-id=\"7\""));
    assert!(html.contains("data-action=\"play\" data-id=\"7\""));
    assert!(html.contains("Grace &lt;Abounds&gt;"));
    assert!(html.contains(">007<"));
}
