use std::fmt;
use std::path::Path;

/// Source document kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// IANA root zone database (HTML)
    Iana,
    /// Public Suffix List (line-oriented text)
    Psl,
}

impl SourceKind {
    /// Detect kind from file extension
    pub fn detect(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "html" | "htm" => Some(SourceKind::Iana),
            "dat" => Some(SourceKind::Psl),
            _ => None,
        }
    }

    /// Get default filename for this source
    pub fn default_filename(&self) -> &'static str {
        match self {
            SourceKind::Iana => "iana_root_db.html",
            SourceKind::Psl => "public_suffix_list.dat",
        }
    }

    /// Get default download URL for this source
    pub fn default_url(&self) -> &'static str {
        match self {
            SourceKind::Iana => "https://www.iana.org/domains/root/db",
            SourceKind::Psl => "https://publicsuffix.org/list/public_suffix_list.dat",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Iana => f.write_str("IANA"),
            SourceKind::Psl => f.write_str("PSL"),
        }
    }
}
