//! Rendered list container with delegated card actions.
//!
//! Cards carry only data (`data-id`, `data-action`). All interaction goes
//! through the one listener owned by the container, so cards can be replaced
//! at any time without leaking handlers.

use crate::model::item::{ItemId, Mood};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Action exposed by every card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTag {
    ToggleFavorite,
    Play,
}

impl ActionTag {
    pub const CARD_ACTIONS: [ActionTag; 2] = [ActionTag::ToggleFavorite, ActionTag::Play];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionTag::ToggleFavorite => "toggle-favorite",
            ActionTag::Play => "play",
        }
    }
}

impl FromStr for ActionTag {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ActionTag::CARD_ACTIONS
            .into_iter()
            .find(|tag| tag.as_str() == value)
            .ok_or(())
    }
}

/// Action resolved from a click inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardAction {
    pub action: ActionTag,
    pub item_id: ItemId,
}

/// Data attributes of the node a click landed on, as reported by the shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventTarget<'a> {
    pub action: Option<&'a str>,
    pub item_id: Option<&'a str>,
}

impl<'a> EventTarget<'a> {
    pub fn new(action: &'a str, item_id: &'a str) -> Self {
        Self {
            action: Some(action),
            item_id: Some(item_id),
        }
    }
}

/// One rendered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub item_id: ItemId,
    pub number: String,
    pub title: String,
    pub favorite: bool,
    pub mood: Option<Mood>,
    pub note_preview: Option<String>,
    pub actions: [ActionTag; 2],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Card(Card),
    Empty { message: String },
}

type ActionListener = Box<dyn FnMut(CardAction)>;

/// Target of list reconciliation.
pub struct Container {
    name: String,
    nodes: Vec<Node>,
    listener: Option<ActionListener>,
    full_renders: usize,
    card_updates: usize,
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("nodes", &self.nodes)
            .field("has_listener", &self.listener.is_some())
            .field("full_renders", &self.full_renders)
            .field("card_updates", &self.card_updates)
            .finish()
    }
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            listener: None,
            full_renders: 0,
            card_updates: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Card(card) => Some(card),
            Node::Empty { .. } => None,
        })
    }

    pub fn card(&self, id: ItemId) -> Option<&Card> {
        self.cards().find(|card| card.item_id == id)
    }

    pub fn displayed_ids(&self) -> Vec<ItemId> {
        self.cards().map(|card| card.item_id).collect()
    }

    pub fn is_showing_empty_state(&self) -> bool {
        matches!(self.nodes.as_slice(), [Node::Empty { .. }])
    }

    pub fn full_renders(&self) -> usize {
        self.full_renders
    }

    pub fn card_updates(&self) -> usize {
        self.card_updates
    }

    /// Installs the container's delegated listener, replacing any previous one.
    pub fn on_action(&mut self, listener: impl FnMut(CardAction) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Resolves a click through delegation.
    ///
    /// Returns `None` when the target carries no known action, no parsable
    /// id, or an id not currently displayed here.
    pub fn click(&mut self, target: EventTarget<'_>) -> Option<CardAction> {
        let action = target.action?.parse::<ActionTag>().ok()?;
        let item_id = target.item_id?.trim().parse::<ItemId>().ok()?;
        self.card(item_id)?;

        let resolved = CardAction { action, item_id };
        if let Some(listener) = self.listener.as_mut() {
            listener(resolved);
        }
        Some(resolved)
    }

    pub(crate) fn replace_all(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
        self.full_renders += 1;
    }

    pub(crate) fn replace_card(&mut self, card: Card) -> bool {
        let slot = self.nodes.iter_mut().find(|node| match node {
            Node::Card(existing) => existing.item_id == card.item_id,
            Node::Empty { .. } => false,
        });
        match slot {
            Some(node) => {
                *node = Node::Card(card);
                self.card_updates += 1;
                true
            }
            None => false,
        }
    }

    /// Markup for shells that display HTML.
    pub fn to_html(&self) -> String {
        Markup(self).to_string()
    }
}

struct Markup<'a>(&'a Container);

impl Display for Markup<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<div class=\"list\" data-list=\"{}\">", escape(&self.0.name))?;
        for node in &self.0.nodes {
            match node {
                Node::Empty { message } => {
                    write!(f, "<div class=\"empty-state\">{}</div>", escape(message))?;
                }
                Node::Card(card) => write_card(f, card)?,
            }
        }
        f.write_str("</div>")
    }
}

fn write_card(f: &mut Formatter<'_>, card: &Card) -> std::fmt::Result {
    let favorite_class = if card.favorite { " favorite" } else { "" };
    write!(
        f,
        "<div class=\"card{favorite_class}\" data-id=\"{}\"><span class=\"number\">{}</span><span class=\"title\">{}</span>",
        card.item_id,
        escape(&card.number),
        escape(&card.title)
    )?;
    if let Some(mood) = card.mood {
        write!(f, "<span class=\"mood\">{mood}</span>")?;
    }
    if let Some(preview) = &card.note_preview {
        write!(f, "<span class=\"note\">{}</span>", escape(preview))?;
    }
    for action in card.actions {
        write!(
            f,
            "<button data-action=\"{}\" data-id=\"{}\"></button>",
            action.as_str(),
            card.item_id
        )?;
    }
    f.write_str("</div>")
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
