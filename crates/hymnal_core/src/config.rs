//! Runtime configuration resolved from environment variables.
//!
//! Blank or missing values fall back to defaults; values are trimmed.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "HYMNAL_DB_PATH";
pub const ENV_CATALOG: &str = "HYMNAL_CATALOG";
pub const ENV_CONTENT_DIR: &str = "HYMNAL_CONTENT_DIR";
pub const ENV_LOG_LEVEL: &str = "HYMNAL_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "hymnal_annotations.sqlite3";
const DEFAULT_CATALOG_REF: &str = "hymns.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Annotation database file.
    pub db_path: PathBuf,
    /// Root that catalog and lyric references resolve against.
    pub content_dir: PathBuf,
    /// Catalog document reference, relative to `content_dir`.
    pub catalog_ref: String,
    pub log_level: String,
}

impl BrowserConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, used by tests in place of
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        Self {
            db_path: value(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            content_dir: value(ENV_CONTENT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            catalog_ref: value(ENV_CATALOG).unwrap_or_else(|| DEFAULT_CATALOG_REF.to_string()),
            log_level: value(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
        }
    }
}
