//! Package index
//!
//! The index answers "which archive file backs this uid". The cache
//! only depends on the [`PackageIndex`] trait; the bundled
//! [`DataDirIndex`] implementation scans a directory of zip archives
//! and reads each manifest once, answering lookups from memory.

use crate::error::{PackserveError, PackserveResult};
use crate::package::manifest::PackageManifest;
use crate::package::PackageArchive;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// One index entry: the backing archive plus its manifest
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Archive filename relative to the data directory
    pub filename: String,

    /// Manifest read from that archive
    pub manifest: PackageManifest,
}

/// Maps package uids to their backing archives
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Look up the entry for `uid`, failing with `PackageNotFound` when
    /// the index has no such package
    async fn lookup(&self, uid: &str) -> PackserveResult<IndexEntry>;
}

/// Index over a flat directory of `*.zip` package archives
pub struct DataDirIndex {
    data_dir: PathBuf,
    entries: RwLock<HashMap<String, IndexEntry>>,
}

impl DataDirIndex {
    /// Create an index over `data_dir`; the first lookup scans it
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The directory of package archives
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Rescan the data directory, replacing the in-memory map.
    ///
    /// Unreadable archives and archives without a parseable manifest
    /// are skipped with a warning; one bad file must not hide the rest
    /// of the repository.
    pub async fn refresh(&self) -> PackserveResult<usize> {
        let mut found = HashMap::new();

        let mut dir = tokio::fs::read_dir(&self.data_dir).await.map_err(|e| {
            PackserveError::io(format!("reading data dir {}", self.data_dir.display()), e)
        })?;

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| PackserveError::io("iterating data dir", e))?
        {
            let path = entry.path();
            let is_zip = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
            if !is_zip {
                continue;
            }

            let filename = entry.file_name().to_string_lossy().into_owned();

            let manifest = match read_archive_manifest(&path).await {
                Ok(m) => m,
                Err(e) => {
                    warn!("skipping {}: {}", filename, e);
                    continue;
                }
            };

            debug!("indexed {} -> {}", manifest.uid, filename);
            found.insert(
                manifest.uid.clone(),
                IndexEntry { filename, manifest },
            );
        }

        let count = found.len();
        *self.entries.write().await = found;
        info!("indexed {} package(s) in {}", count, self.data_dir.display());
        Ok(count)
    }

    /// All indexed manifests, for listing
    pub async fn packages(&self) -> Vec<PackageManifest> {
        self.entries
            .read()
            .await
            .values()
            .map(|e| e.manifest.clone())
            .collect()
    }
}

async fn read_archive_manifest(path: &Path) -> PackserveResult<PackageManifest> {
    let archive = PackageArchive::open(path)?;
    archive.read_manifest().await
}

#[async_trait]
impl PackageIndex for DataDirIndex {
    async fn lookup(&self, uid: &str) -> PackserveResult<IndexEntry> {
        if let Some(entry) = self.entries.read().await.get(uid) {
            return Ok(entry.clone());
        }

        // Miss: the archive may have been added since the last scan
        self.refresh().await?;

        self.entries
            .read()
            .await
            .get(uid)
            .cloned()
            .ok_or_else(|| PackserveError::PackageNotFound(uid.to_string()))
    }
}
