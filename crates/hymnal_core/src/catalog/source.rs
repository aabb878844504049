//! Text source contract and a directory-backed implementation.

use log::debug;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};

/// Fetch failure for catalog or lyric text.
#[derive(Debug)]
pub enum SourceError {
    NotFound(String),
    /// Reference escapes the source root or is otherwise unusable.
    InvalidReference(String),
    Io {
        reference: String,
        source: std::io::Error,
    },
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(reference) => write!(f, "`{reference}` not found"),
            Self::InvalidReference(reference) => write!(f, "invalid reference `{reference}`"),
            Self::Io { reference, source } => write!(f, "failed to read `{reference}`: {source}"),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::NotFound(_) | Self::InvalidReference(_) => None,
        }
    }
}

/// Read-only text fetcher keyed by reference string.
pub trait TextSource {
    fn fetch_text(&self, reference: &str) -> Result<String, SourceError>;
}

impl<S: TextSource + ?Sized> TextSource for &S {
    fn fetch_text(&self, reference: &str) -> Result<String, SourceError> {
        (**self).fetch_text(reference)
    }
}

/// Resolves references as relative paths under one root directory.
#[derive(Debug, Clone)]
pub struct FsTextSource {
    root: PathBuf,
}

impl FsTextSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(reference.trim());
        let is_contained = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if reference.trim().is_empty() || !is_contained {
            return Err(SourceError::InvalidReference(reference.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl TextSource for FsTextSource {
    fn fetch_text(&self, reference: &str) -> Result<String, SourceError> {
        let path = self.resolve(reference)?;
        debug!("event=source_fetch module=catalog status=start reference={reference}");
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound(reference.to_string())
            } else {
                SourceError::Io {
                    reference: reference.to_string(),
                    source,
                }
            }
        })
    }
}

/// Fixed reference -> text table. Unknown references are `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct StaticTextSource {
    entries: BTreeMap<String, String>,
}

impl StaticTextSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reference: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(reference.into(), text.into());
        self
    }
}

impl TextSource for StaticTextSource {
    fn fetch_text(&self, reference: &str) -> Result<String, SourceError> {
        self.entries
            .get(reference)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(reference.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{FsTextSource, SourceError, TextSource};

    #[test]
    fn fs_source_rejects_references_outside_root() {
        let source = FsTextSource::new("/srv/hymns");
        for reference in ["../secret.txt", "/etc/passwd", "   "] {
            let err = source.fetch_text(reference).unwrap_err();
            assert!(matches!(err, SourceError::InvalidReference(_)), "{reference}");
        }
    }

    #[test]
    fn fs_source_reads_relative_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("lyrics")).unwrap();
        std::fs::write(dir.path().join("lyrics/001.txt"), "Amazing grace").unwrap();

        let source = FsTextSource::new(dir.path());
        assert_eq!(source.fetch_text("lyrics/001.txt").unwrap(), "Amazing grace");
        assert!(matches!(
            source.fetch_text("lyrics/404.txt"),
            Err(SourceError::NotFound(_))
        ));
    }
}
