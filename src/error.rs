use thiserror::Error;

use crate::source::SourceKind;

/// Classifies source loading errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// Required path or URL not configured
    NotConfigured,
    /// File open/read/write failure
    FileError,
    /// Download or verification failure
    DownloadFailed,
    /// Downloaded or cached data could not be used
    InvalidData,
}

/// Domain suffix error types
#[derive(Error, Debug)]
pub enum SuffixError {
    /// A source document's top-level structure is not recognized.
    #[error("{kind} source format error: {message}")]
    SourceFormat { kind: SourceKind, message: String },

    /// The build inputs cannot produce a valid table.
    #[error("Merge error: {0}")]
    Merge(String),

    /// The name passed to a lookup is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Load error: {message}")]
    LoadError {
        kind: LoadErrorKind,
        message: String,
    },

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SuffixError {
    pub(crate) fn source_format(kind: SourceKind, message: impl Into<String>) -> Self {
        SuffixError::SourceFormat {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn load(kind: LoadErrorKind, message: impl Into<String>) -> Self {
        SuffixError::LoadError {
            kind,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SuffixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_format_kind_is_matchable() {
        let err = SuffixError::source_format(SourceKind::Psl, "no section markers");
        match &err {
            SuffixError::SourceFormat { kind, .. } => {
                assert_eq!(*kind, SourceKind::Psl);
            }
            _ => panic!("expected SourceFormat"),
        }
    }

    #[test]
    fn test_source_format_display_names_source() {
        let err = SuffixError::source_format(SourceKind::Iana, "tld-table not found");
        let display = format!("{}", err);
        assert!(display.contains("IANA"), "got: {}", display);
        assert!(display.contains("tld-table not found"), "got: {}", display);
    }

    #[test]
    fn test_load_error_kind_is_matchable() {
        let err = SuffixError::load(LoadErrorKind::DownloadFailed, "connection refused");
        match &err {
            SuffixError::LoadError { kind, .. } => {
                assert!(matches!(kind, LoadErrorKind::DownloadFailed));
            }
            _ => panic!("expected LoadError"),
        }
    }

    #[test]
    fn test_io_error_converts() {
        fn open() -> Result<()> {
            std::fs::File::open("/nonexistent/domain-suffixes/file")?;
            Ok(())
        }
        assert!(matches!(open(), Err(SuffixError::IoError(_))));
    }
}
