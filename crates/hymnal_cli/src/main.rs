//! CLI smoke and inspection entry point.
//!
//! # Responsibility
//! - Verify `hymnal_core` linkage with deterministic output.
//! - Print one lens of a catalog file: `hymnal_cli [catalog.json] [lens] [query]`.

use hymnal_core::db::open_db;
use hymnal_core::{
    project, AnnotationStore, BrowserConfig, FsTextSource, ItemStore, Lens, Snapshot,
    SqliteSlotRepository, TextQuery,
};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("hymnal_core ping={}", hymnal_core::ping());
    println!("hymnal_core version={}", hymnal_core::core_version());

    let mut args = std::env::args().skip(1);
    let Some(catalog_path) = args.next() else {
        return ExitCode::SUCCESS;
    };
    let lens = match args.next().as_deref().unwrap_or("all").parse::<Lens>() {
        Ok(lens) => lens,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };
    let query = TextQuery::new(&args.next().unwrap_or_default());

    let path = Path::new(&catalog_path);
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let loaded = ItemStore::load(&FsTextSource::new(root), file_name);
    if let Some(warning) = &loaded.warning {
        eprintln!("warning: {warning}");
    }

    let config = BrowserConfig::from_env();
    let annotations = match open_db(&config.db_path) {
        Ok(conn) => {
            AnnotationStore::load_persisted(SqliteSlotRepository::new(conn))
                .0
                .export_snapshot()
        }
        Err(err) => {
            eprintln!("warning: annotations unavailable: {err}");
            Snapshot::default()
        }
    };

    let projected = project(lens, &query, &loaded.store, &annotations);
    if projected.is_empty() {
        println!("(no hymns in view `{lens}`)");
    }
    for item in projected {
        let marker = if annotations.favorites.contains(&item.id) {
            "*"
        } else {
            " "
        };
        println!("{marker} {} {}", item.number_label(), item.title);
    }
    ExitCode::SUCCESS
}
