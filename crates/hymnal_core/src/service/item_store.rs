//! Immutable catalog plus lazily fetched lyric bodies.
//!
//! # Responsibility
//! - Load the catalog once, degrading to the built-in sample on failure.
//! - Fetch each item's referenced body at most once and cache the outcome.
//!
//! # Invariants
//! - Item ids are unique; a catalog with duplicate ids is rejected whole.
//! - The sample catalog and a real catalog are never mixed.
//! - A failed body fetch is cached as unavailable and never retried.

use crate::catalog::fallback::sample_catalog;
use crate::catalog::source::TextSource;
use crate::model::item::{Item, ItemId};
use log::{info, warn};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

/// Shown when an item has no lyrics or they could not be fetched.
pub const BODY_UNAVAILABLE: &str = "Lyrics unavailable.";

/// Where the loaded catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    Source,
    Fallback,
}

/// Result of [`ItemStore::load`]. `warning` is set when the fallback was used.
#[derive(Debug)]
pub struct CatalogLoad {
    pub store: ItemStore,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CachedBody {
    Fetched(String),
    Unavailable,
}

/// Catalog owner. Items are read-only after construction.
#[derive(Debug)]
pub struct ItemStore {
    items: Vec<Item>,
    index: HashMap<ItemId, usize>,
    origin: CatalogOrigin,
    bodies: BTreeMap<ItemId, CachedBody>,
}

impl ItemStore {
    /// Loads the catalog document at `catalog_ref` from `source`.
    ///
    /// Never fails. Any fetch or shape problem yields the sample catalog and
    /// a warning message for the caller to surface.
    pub fn load(source: &dyn TextSource, catalog_ref: &str) -> CatalogLoad {
        let started_at = Instant::now();
        let parsed = source
            .fetch_text(catalog_ref)
            .map_err(|err| err.to_string())
            .and_then(|raw| parse_catalog(&raw));

        match parsed {
            Ok(items) => {
                info!(
                    "event=catalog_load module=catalog status=ok origin=source items={} duration_ms={}",
                    items.len(),
                    started_at.elapsed().as_millis()
                );
                CatalogLoad {
                    store: Self::from_parts(items, CatalogOrigin::Source),
                    warning: None,
                }
            }
            Err(reason) => {
                warn!(
                    "event=catalog_load module=catalog status=degraded origin=fallback duration_ms={} error={reason}",
                    started_at.elapsed().as_millis()
                );
                CatalogLoad {
                    store: Self::fallback(),
                    warning: Some(format!(
                        "Could not load hymns ({reason}); showing a sample set."
                    )),
                }
            }
        }
    }

    /// Builds a store over an already-validated item list.
    ///
    /// Later duplicates of an id are ignored.
    pub fn from_items(items: Vec<Item>) -> Self {
        Self::from_parts(items, CatalogOrigin::Source)
    }

    /// Store over the built-in sample catalog.
    pub fn fallback() -> Self {
        Self::from_parts(sample_catalog(), CatalogOrigin::Fallback)
    }

    fn from_parts(items: Vec<Item>, origin: CatalogOrigin) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.id))
            .collect::<Vec<_>>();
        let index = items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.id, position))
            .collect();
        Self {
            items,
            index,
            origin,
            bodies: BTreeMap::new(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    pub fn find_by_id(&self, id: ItemId) -> Option<&Item> {
        self.index.get(&id).map(|&position| &self.items[position])
    }

    /// Inline or previously fetched body. Performs no I/O.
    pub fn cached_body(&self, id: ItemId) -> Option<&str> {
        let item = self.find_by_id(id)?;
        if let Some(body) = item.body.as_deref() {
            return Some(body);
        }
        match self.bodies.get(&id) {
            Some(CachedBody::Fetched(body)) => Some(body.as_str()),
            Some(CachedBody::Unavailable) | None => None,
        }
    }

    /// Returns the item's body, fetching its reference on first use.
    pub fn body(&mut self, id: ItemId, source: &dyn TextSource) -> String {
        let Some(item) = self.find_by_id(id) else {
            return BODY_UNAVAILABLE.to_string();
        };
        if let Some(body) = item.body.as_deref() {
            return body.to_string();
        }
        match self.bodies.get(&id) {
            Some(CachedBody::Fetched(body)) => return body.clone(),
            Some(CachedBody::Unavailable) => return BODY_UNAVAILABLE.to_string(),
            None => {}
        }
        let Some(reference) = item.body_ref.clone() else {
            return BODY_UNAVAILABLE.to_string();
        };

        let cached = match source.fetch_text(&reference) {
            Ok(text) => {
                info!("event=body_fetch module=catalog status=ok item_id={id}");
                CachedBody::Fetched(text)
            }
            Err(err) => {
                warn!("event=body_fetch module=catalog status=degraded item_id={id} error={err}");
                CachedBody::Unavailable
            }
        };
        let body = match &cached {
            CachedBody::Fetched(text) => text.clone(),
            CachedBody::Unavailable => BODY_UNAVAILABLE.to_string(),
        };
        self.bodies.insert(id, cached);
        body
    }
}

fn parse_catalog(raw: &str) -> Result<Vec<Item>, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|err| format!("malformed catalog: {err}"))?;
    if !value.is_array() {
        return Err("catalog must be a list".to_string());
    }
    let items: Vec<Item> =
        serde_json::from_value(value).map_err(|err| format!("malformed catalog entry: {err}"))?;

    let mut seen = HashSet::new();
    if let Some(duplicate) = items.iter().find(|item| !seen.insert(item.id)) {
        return Err(format!("duplicate item id {}", duplicate.id));
    }
    Ok(items)
}
