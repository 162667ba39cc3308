use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LoadErrorKind, Result, SuffixError};

use super::format::SourceKind;
use super::{iana, psl};

/// Default update interval: 7 days
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Trait for loading raw source documents
pub trait SourceLoader: Send + Sync {
    /// Load the raw text of a source document
    fn load_source(&self, kind: SourceKind) -> Result<String>;
}

/// File-based SourceLoader
#[derive(Debug, Clone, Default)]
pub struct FileSourceLoader {
    iana_path: Option<PathBuf>,
    psl_path: Option<PathBuf>,
}

impl FileSourceLoader {
    /// Create a new FileSourceLoader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the IANA root zone database file path
    pub fn with_iana_path(mut self, path: impl AsRef<Path>) -> Self {
        self.iana_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the Public Suffix List file path
    pub fn with_psl_path(mut self, path: impl AsRef<Path>) -> Self {
        self.psl_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set a path whose kind is detected from its extension
    pub fn with_path(self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match SourceKind::detect(path) {
            Some(SourceKind::Iana) => Ok(self.with_iana_path(path)),
            Some(SourceKind::Psl) => Ok(self.with_psl_path(path)),
            None => Err(SuffixError::load(
                LoadErrorKind::NotConfigured,
                format!("Cannot detect source kind of {}", path.display()),
            )),
        }
    }

    fn path(&self, kind: SourceKind) -> Option<&PathBuf> {
        match kind {
            SourceKind::Iana => self.iana_path.as_ref(),
            SourceKind::Psl => self.psl_path.as_ref(),
        }
    }
}

impl SourceLoader for FileSourceLoader {
    fn load_source(&self, kind: SourceKind) -> Result<String> {
        let path = self.path(kind).ok_or_else(|| {
            SuffixError::load(
                LoadErrorKind::NotConfigured,
                format!("{} path not configured", kind),
            )
        })?;
        read_source(path)
    }
}

/// In-memory SourceLoader for testing and embedding
#[derive(Debug, Clone, Default)]
pub struct MemorySourceLoader {
    sources: HashMap<SourceKind, String>,
}

impl MemorySourceLoader {
    pub fn new(iana: impl Into<String>, psl: impl Into<String>) -> Self {
        let mut sources = HashMap::new();
        sources.insert(SourceKind::Iana, iana.into());
        sources.insert(SourceKind::Psl, psl.into());
        Self { sources }
    }

    pub fn set_source(&mut self, kind: SourceKind, text: impl Into<String>) {
        self.sources.insert(kind, text.into());
    }
}

impl SourceLoader for MemorySourceLoader {
    fn load_source(&self, kind: SourceKind) -> Result<String> {
        self.sources.get(&kind).cloned().ok_or_else(|| {
            SuffixError::load(
                LoadErrorKind::NotConfigured,
                format!("{} source not available", kind),
            )
        })
    }
}

// Helper functions

pub(crate) fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        SuffixError::load(
            LoadErrorKind::FileError,
            format!("Failed to read {}: {}", path.display(), e),
        )
    })
}

/// Verify that a source file parses as its kind
pub(crate) fn verify_source_file(path: &Path, kind: SourceKind) -> Result<()> {
    let text = read_source(path)?;
    let empty = match kind {
        SourceKind::Iana => iana::parse_iana(&text)?.is_empty(),
        SourceKind::Psl => psl::parse_psl(&text)?.is_empty(),
    };
    if empty {
        return Err(SuffixError::load(
            LoadErrorKind::InvalidData,
            format!("{} source {} has no entries", kind, path.display()),
        ));
    }
    Ok(())
}
