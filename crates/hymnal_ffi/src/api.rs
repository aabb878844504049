//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose annotation and list use-cases to Dart via FRB.
//! - Convert every core error into a response envelope.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Each call opens its own connection; no state is cached besides config.

use hymnal_core::db::open_db;
use hymnal_core::view::render::build_card;
use hymnal_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    project, AnnotationStore, BrowserConfig, CatalogOrigin, FieldOutcome, FsTextSource, ItemId,
    ItemStore, Lens, Mood, NoteChange, SqliteSlotRepository, TextQuery,
};
use log::warn;
use std::sync::OnceLock;

static CONFIG: OnceLock<BrowserConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
/// Safe to call repeatedly with the same `level + log_dir`.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One card of a list response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HymnListItem {
    pub item_id: u32,
    /// Zero-padded display number (`"007"`).
    pub number: String,
    pub title: String,
    pub favorite: bool,
    /// User mood label, if tagged.
    pub mood: Option<String>,
    pub note_preview: Option<String>,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HymnListResponse {
    /// Items in catalog order. Empty means "show the empty state".
    pub items: Vec<HymnListItem>,
    /// Whether the built-in sample catalog was used.
    pub sample_catalog: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HymnActionResponse {
    pub ok: bool,
    pub item_id: Option<u32>,
    pub message: String,
}

impl HymnActionResponse {
    fn success(message: impl Into<String>, item_id: Option<ItemId>) -> Self {
        Self {
            ok: true,
            item_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item_id: None,
            message: message.into(),
        }
    }
}

/// Lists items through a lens (`all|favorites|notes|mood:<label>`).
///
/// `query` narrows the `all` lens only.
#[flutter_rust_bridge::frb(sync)]
pub fn browser_list(lens: String, query: String) -> HymnListResponse {
    let lens = match lens.parse::<Lens>() {
        Ok(lens) => lens,
        Err(err) => {
            return HymnListResponse {
                items: Vec::new(),
                sample_catalog: false,
                message: format!("browser_list failed: {err}"),
            }
        }
    };

    let config = resolve_config();
    let source = FsTextSource::new(config.content_dir.clone());
    let loaded = ItemStore::load(&source, &config.catalog_ref);
    let items = loaded.store;

    let listed = with_annotations(|store| {
        let projected = project(lens, &TextQuery::new(&query), &items, &*store);
        Ok(projected
            .into_iter()
            .map(|item| {
                let card = build_card(item, &*store);
                HymnListItem {
                    item_id: card.item_id,
                    number: card.number,
                    title: card.title,
                    favorite: card.favorite,
                    mood: card.mood.map(|mood| mood.to_string()),
                    note_preview: card.note_preview,
                }
            })
            .collect::<Vec<_>>())
    });

    let sample_catalog = items.origin() == CatalogOrigin::Fallback;
    match listed {
        Ok(list) => {
            let message = match (&loaded.warning, list.is_empty()) {
                (Some(warning), _) => warning.clone(),
                (None, true) => "No hymns to show.".to_string(),
                (None, false) => format!("{} hymn(s).", list.len()),
            };
            HymnListResponse {
                items: list,
                sample_catalog,
                message,
            }
        }
        Err(err) => HymnListResponse {
            items: Vec::new(),
            sample_catalog,
            message: format!("browser_list failed: {err}"),
        },
    }
}

/// Toggles favorite membership; the message says which way it went.
#[flutter_rust_bridge::frb(sync)]
pub fn browser_toggle_favorite(item_id: u32) -> HymnActionResponse {
    match with_annotations(|store| store.toggle_favorite(item_id).map_err(|err| err.to_string()))
    {
        Ok(true) => HymnActionResponse::success("Added to favorites.", Some(item_id)),
        Ok(false) => HymnActionResponse::success("Removed from favorites.", Some(item_id)),
        Err(err) => HymnActionResponse::failure(format!("browser_toggle_favorite failed: {err}")),
    }
}

/// Saves a note; blank text clears it.
#[flutter_rust_bridge::frb(sync)]
pub fn browser_save_note(item_id: u32, text: String) -> HymnActionResponse {
    match with_annotations(|store| store.set_note(item_id, &text).map_err(|err| err.to_string())) {
        Ok(NoteChange::Saved) => HymnActionResponse::success("Note saved.", Some(item_id)),
        Ok(NoteChange::Cleared) => HymnActionResponse::success("Note cleared.", Some(item_id)),
        Err(err) => HymnActionResponse::failure(format!("browser_save_note failed: {err}")),
    }
}

/// Tags an item with a mood from the fixed vocabulary.
#[flutter_rust_bridge::frb(sync)]
pub fn browser_set_mood(item_id: u32, mood: String) -> HymnActionResponse {
    let mood = match mood.parse::<Mood>() {
        Ok(mood) => mood,
        Err(err) => return HymnActionResponse::failure(format!("browser_set_mood failed: {err}")),
    };
    match with_annotations(|store| store.set_mood(item_id, mood).map_err(|err| err.to_string())) {
        Ok(()) => HymnActionResponse::success(format!("Mood set to {mood}."), Some(item_id)),
        Err(err) => HymnActionResponse::failure(format!("browser_set_mood failed: {err}")),
    }
}

/// Returns the export document, or an empty string on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn browser_export() -> String {
    let exported = with_annotations(|store| {
        serde_json::to_string_pretty(&store.export_snapshot()).map_err(|err| err.to_string())
    });
    exported.unwrap_or_else(|err| {
        warn!("event=ffi_export module=ffi status=error error={err}");
        String::new()
    })
}

/// Imports an export document; partial imports still report `ok`.
#[flutter_rust_bridge::frb(sync)]
pub fn browser_import(document: String) -> HymnActionResponse {
    match with_annotations(|store| store.import_snapshot(&document).map_err(|err| err.to_string()))
    {
        Ok(report) if report.is_complete() => HymnActionResponse::success("Import complete.", None),
        Ok(report) => {
            let kept = [
                ("favorites", report.favorites),
                ("notes", report.notes),
                ("moods", report.moods),
            ]
            .into_iter()
            .filter(|(_, outcome)| *outcome == FieldOutcome::Kept)
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join(", ");
            HymnActionResponse::success(format!("Import applied; kept existing {kept}."), None)
        }
        Err(err) => HymnActionResponse::failure(format!("browser_import failed: {err}")),
    }
}

/// Clears all annotations. The shell must pass `confirmed = true` only after
/// the user confirmed.
#[flutter_rust_bridge::frb(sync)]
pub fn browser_reset(confirmed: bool) -> HymnActionResponse {
    if !confirmed {
        return HymnActionResponse::failure("browser_reset requires confirmation.");
    }
    match with_annotations(|store| store.reset_all().map_err(|err| err.to_string())) {
        Ok(()) => HymnActionResponse::success("All favorites, notes and moods cleared.", None),
        Err(err) => HymnActionResponse::failure(format!("browser_reset failed: {err}")),
    }
}

fn resolve_config() -> &'static BrowserConfig {
    CONFIG.get_or_init(BrowserConfig::from_env)
}

fn with_annotations<T>(
    f: impl FnOnce(&mut AnnotationStore<SqliteSlotRepository>) -> Result<T, String>,
) -> Result<T, String> {
    let config = resolve_config();
    let conn = open_db(&config.db_path).map_err(|err| format!("annotation DB open failed: {err}"))?;
    let (mut store, report) = AnnotationStore::load_persisted(SqliteSlotRepository::new(conn));
    if !report.is_clean() {
        warn!(
            "event=ffi_annotations_load module=ffi status=degraded recovered={}",
            report.recovered_empty.len()
        );
    }
    f(&mut store)
}
