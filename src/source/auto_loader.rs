use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use log::{info, warn};
use parking_lot::Mutex;

use crate::builder::SuffixTableBuilder;
use crate::error::{LoadErrorKind, Result, SuffixError};
use crate::table::SuffixTable;

use super::format::SourceKind;
use super::loader::{read_source, verify_source_file, SourceLoader, DEFAULT_UPDATE_INTERVAL};

/// Auto SourceLoader with download support and snapshot caching
pub struct AutoSourceLoader {
    // Paths
    pub iana_path: Option<PathBuf>,
    pub psl_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    /// Where the built table is cached as a JSON snapshot
    pub snapshot_path: Option<PathBuf>,

    // Download URLs
    pub iana_url: Option<String>,
    pub psl_url: Option<String>,

    // Update interval
    pub update_interval: Duration,

    download_lock: Mutex<()>,
}

impl AutoSourceLoader {
    /// Create a new AutoSourceLoader using the default source URLs
    pub fn new() -> Self {
        Self {
            iana_path: None,
            psl_path: None,
            data_dir: None,
            snapshot_path: None,
            iana_url: Some(SourceKind::Iana.default_url().to_string()),
            psl_url: Some(SourceKind::Psl.default_url().to_string()),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            download_lock: Mutex::new(()),
        }
    }

    /// Set data directory
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = Some(dir.as_ref().to_path_buf());
        self
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

    /// Cache the built table at this path
    pub fn with_snapshot_path(mut self, path: impl AsRef<Path>) -> Self {
        self.snapshot_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set custom IANA URL
    pub fn with_iana_url(mut self, url: impl Into<String>) -> Self {
        self.iana_url = Some(url.into());
        self
    }

    /// Set custom Public Suffix List URL
    pub fn with_psl_url(mut self, url: impl Into<String>) -> Self {
        self.psl_url = Some(url.into());
        self
    }

    /// Disable downloads: only files already on disk are used
    pub fn offline(mut self) -> Self {
        self.iana_url = None;
        self.psl_url = None;
        self
    }

    /// Set update interval for checking file freshness
    /// Default is 7 days (DEFAULT_UPDATE_INTERVAL)
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Get source file path
    fn get_path(&self, kind: SourceKind) -> PathBuf {
        let explicit = match kind {
            SourceKind::Iana => self.iana_path.as_ref(),
            SourceKind::Psl => self.psl_path.as_ref(),
        };
        if let Some(path) = explicit {
            return path.clone();
        }

        let filename = kind.default_filename();
        match self.data_dir {
            Some(ref dir) => dir.join(filename),
            None => PathBuf::from(filename),
        }
    }

    fn get_url(&self, kind: SourceKind) -> Option<&str> {
        match kind {
            SourceKind::Iana => self.iana_url.as_deref(),
            SourceKind::Psl => self.psl_url.as_deref(),
        }
    }

    /// Check if file is missing, empty or older than the update interval
    fn is_stale(&self, path: &Path) -> bool {
        match fs::metadata(path) {
            Ok(meta) => {
                if meta.len() == 0 {
                    return true;
                }
                match meta.modified() {
                    Ok(mtime) => SystemTime::now()
                        .duration_since(mtime)
                        .map(|d| d > self.update_interval)
                        .unwrap_or(true),
                    Err(_) => true,
                }
            }
            Err(_) => true,
        }
    }

    /// Download file from URL
    fn download(&self, path: &Path, url: &str, kind: SourceKind) -> Result<()> {
        let _lock = self.download_lock.lock();

        // Double-check after acquiring lock
        if !self.is_stale(path) {
            return Ok(());
        }

        info!("downloading {} from {}", path.display(), url);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Download to temporary file
        let tmp_path = path.with_extension("tmp");

        let response = ureq::get(url).call().map_err(|e| {
            SuffixError::load(
                LoadErrorKind::DownloadFailed,
                format!("Download failed: {}", e),
            )
        })?;

        let mut file = fs::File::create(&tmp_path)?;
        let (_, body) = response.into_parts();
        let mut reader = body.into_reader();
        std::io::copy(&mut reader, &mut file)?;
        file.flush()?;
        drop(file);

        if let Err(e) = verify_source_file(&tmp_path, kind) {
            let _ = fs::remove_file(&tmp_path);
            return Err(SuffixError::load(
                LoadErrorKind::DownloadFailed,
                format!("Verification failed: {}", e),
            ));
        }

        fs::rename(&tmp_path, path)?;

        info!("downloaded {} successfully", path.display());
        Ok(())
    }

    /// Ensure a source file is downloaded and available
    fn ensure_downloaded(&self, kind: SourceKind) -> Result<PathBuf> {
        let path = self.get_path(kind);

        if self.is_stale(&path) {
            match self.get_url(kind) {
                Some(url) => {
                    if let Err(e) = self.download(&path, url, kind) {
                        if !path.exists() {
                            return Err(e);
                        }
                        warn!("download failed, using existing file: {}", e);
                    }
                }
                None if !path.exists() => {
                    return Err(SuffixError::load(
                        LoadErrorKind::NotConfigured,
                        format!(
                            "{} file {} missing and no URL configured",
                            kind,
                            path.display()
                        ),
                    ));
                }
                None => {}
            }
        }

        Ok(path)
    }

    /// Load a default-built suffix table, reusing a fresh snapshot when one
    /// is configured and saving one after a rebuild
    pub fn load_table(&self) -> Result<SuffixTable> {
        if let Some(ref snapshot) = self.snapshot_path {
            if !self.is_stale(snapshot) {
                match SuffixTable::load(snapshot) {
                    Ok(table) => {
                        info!("loaded suffix table snapshot from {}", snapshot.display());
                        return Ok(table);
                    }
                    Err(e) => warn!("ignoring unreadable snapshot {}: {}", snapshot.display(), e),
                }
            }
        }

        let table = self.load_table_with(SuffixTableBuilder::new())?;

        if let Some(ref snapshot) = self.snapshot_path {
            if let Err(e) = table.save(snapshot) {
                warn!("failed to save snapshot {}: {}", snapshot.display(), e);
            }
        }

        Ok(table)
    }

    /// Build the suffix table from the sources with a configured builder.
    /// The snapshot only ever holds a default-built table, so it is neither
    /// read nor written here.
    pub fn load_table_with(&self, builder: SuffixTableBuilder) -> Result<SuffixTable> {
        builder.build_from_loader(self)
    }
}

impl Default for AutoSourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceLoader for AutoSourceLoader {
    fn load_source(&self, kind: SourceKind) -> Result<String> {
        let path = self.ensure_downloaded(kind)?;
        read_source(&path)
    }
}
