//! Versioned export/import document for user annotations.
//!
//! # Invariants
//! - Documents without a `version` field are the legacy format, version 0.
//! - Field parsing is per field: one malformed field never poisons another.
//! - Entries that cannot be represented (non-numeric ids, blank notes,
//!   moods outside the vocabulary) are dropped, not stored.

use crate::model::item::{ItemId, Mood};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Version written by [`Snapshot`] exports.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Detached copy of all annotation collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub favorites: Vec<ItemId>,
    pub notes: BTreeMap<ItemId, String>,
    pub moods: BTreeMap<ItemId, Mood>,
}

/// Import document split into independently validated fields.
///
/// `None` means the field was absent or had the wrong shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotFields {
    pub version: u32,
    pub favorites: Option<BTreeSet<ItemId>>,
    pub notes: Option<BTreeMap<ItemId, String>>,
    pub moods: Option<BTreeMap<ItemId, Mood>>,
}

/// Why a whole import document was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotRejection {
    NotJson(String),
    NotAnObject,
    InvalidVersion,
    UnsupportedVersion(u64),
}

impl SnapshotFields {
    /// Splits a raw JSON document into fields.
    pub fn parse(raw: &str) -> Result<Self, SnapshotRejection> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| SnapshotRejection::NotJson(err.to_string()))?;
        let Value::Object(object) = value else {
            return Err(SnapshotRejection::NotAnObject);
        };
        Self::from_object(&object)
    }

    fn from_object(object: &Map<String, Value>) -> Result<Self, SnapshotRejection> {
        let version = match object.get("version") {
            None | Some(Value::Null) => 0,
            Some(value) => {
                let version = value.as_u64().ok_or(SnapshotRejection::InvalidVersion)?;
                if version > u64::from(SNAPSHOT_VERSION) {
                    return Err(SnapshotRejection::UnsupportedVersion(version));
                }
                version as u32
            }
        };

        Ok(Self {
            version,
            favorites: object.get("favorites").and_then(parse_favorites),
            notes: object.get("notes").and_then(parse_notes),
            moods: object.get("moods").and_then(parse_moods),
        })
    }
}

/// Parses a favorites list. Returns `None` unless the value is an array.
pub fn parse_favorites(value: &Value) -> Option<BTreeSet<ItemId>> {
    let Value::Array(entries) = value else {
        return None;
    };
    Some(entries.iter().filter_map(parse_id_value).collect())
}

/// Parses an id -> note mapping. Returns `None` unless the value is an object.
pub fn parse_notes(value: &Value) -> Option<BTreeMap<ItemId, String>> {
    let Value::Object(entries) = value else {
        return None;
    };
    Some(
        entries
            .iter()
            .filter_map(|(key, note)| {
                let id = parse_id_key(key)?;
                let text = note.as_str()?.trim();
                (!text.is_empty()).then(|| (id, text.to_string()))
            })
            .collect(),
    )
}

/// Parses an id -> mood mapping. Returns `None` unless the value is an object.
pub fn parse_moods(value: &Value) -> Option<BTreeMap<ItemId, Mood>> {
    let Value::Object(entries) = value else {
        return None;
    };
    Some(
        entries
            .iter()
            .filter_map(|(key, mood)| {
                let id = parse_id_key(key)?;
                let mood = mood.as_str()?.parse::<Mood>().ok()?;
                Some((id, mood))
            })
            .collect(),
    )
}

fn parse_id_value(value: &Value) -> Option<ItemId> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|id| ItemId::try_from(id).ok()),
        Value::String(text) => parse_id_key(text),
        _ => None,
    }
}

fn parse_id_key(key: &str) -> Option<ItemId> {
    key.trim().parse::<ItemId>().ok()
}
