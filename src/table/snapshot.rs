//! JSON snapshots of a built table.
//!
//! A snapshot stores every entry with all its fields. Loading re-indexes the
//! entries through the same path the builder uses, so a loaded table answers
//! lookups exactly like the one that was saved.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SuffixError};
use crate::types::SuffixEntry;

use super::SuffixTable;

/// Format version written into every snapshot
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    entries: &'a [SuffixEntry],
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    entries: Vec<SuffixEntry>,
}

impl SuffixTable {
    /// Serialize all entries to a JSON snapshot
    pub fn to_json(&self) -> Result<String> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            entries: &self.entries,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Rebuild a table from a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SuffixError::Snapshot(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }
        SuffixTable::from_entries(snapshot.entries).map_err(SuffixError::Snapshot)
    }

    /// Write a snapshot to a file, replacing it atomically
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, self.to_json()?)?;
        fs::rename(&tmp_path, path)?;

        debug!("saved {} entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Read a snapshot file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }
}
