//! Per-package cache records
//!
//! A cached package is a directory named by uid under the cache root,
//! holding a serialized copy of the manifest plus lazily extracted
//! members. Presence of the serialized manifest is the sole signal that
//! a package is known to the cache; there is no separate index.
//!
//! Layout under cache root `R`:
//!
//! | Path | Contents |
//! |------|----------|
//! | `R/<uid>/package.json` | serialized manifest (presence = cached) |
//! | `R/<uid>/...` | raw extracted members, archive-relative paths |
//! | `R/<uid>/files/...` | raw extraction root for multi-file content |
//! | `R/content/<uid>/...` | canonical flattened content directory |

use crate::error::{PackserveError, PackserveResult};
use crate::package::manifest::PackageManifest;
use crate::package::MANIFEST_MEMBER;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Directory name of the canonical content area under the cache root
pub const CONTENT_DIR: &str = "content";

/// Sub-root inside a package archive for multi-file content
pub const FILES_PREFIX: &str = "files/";

/// On-disk record for one cached package
#[derive(Debug, Clone)]
pub struct CacheRecord {
    uid: String,
    dir: PathBuf,
    content_dir: PathBuf,
}

impl CacheRecord {
    /// Record for `uid` under `cache_root`; touches nothing on disk
    pub fn new(cache_root: &Path, uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            dir: cache_root.join(uid),
            content_dir: cache_root.join(CONTENT_DIR).join(uid),
        }
    }

    /// Package identifier
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Raw per-package cache directory (`R/<uid>`)
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Canonical flattened content directory (`R/content/<uid>`)
    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Path of the serialized manifest copy
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_MEMBER)
    }

    /// Absolute path of a member inside the raw cache directory
    pub fn member_path(&self, relative: &str) -> PathBuf {
        self.dir.join(relative.replace('\\', "/"))
    }

    /// Whether this package is known to the cache
    pub fn exists(&self) -> bool {
        self.manifest_path().is_file()
    }

    /// Read the stored manifest copy
    pub async fn read_manifest(&self) -> PackserveResult<PackageManifest> {
        let path = self.manifest_path();
        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| PackserveError::io(format!("reading {}", path.display()), e))?;
        PackageManifest::parse(&content, &path)
    }

    /// Create the record directory and write the manifest copy in a
    /// single create-then-write step
    pub async fn write_manifest(&self, manifest: &PackageManifest) -> PackserveResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PackserveError::io(format!("creating {}", self.dir.display()), e))?;

        let content = serde_json::to_string(manifest)?;
        let path = self.manifest_path();
        fs::write(&path, content)
            .await
            .map_err(|e| PackserveError::io(format!("writing {}", path.display()), e))?;

        debug!("cached manifest for {}", self.uid);
        Ok(())
    }

    /// Delete everything cached for this package, both the raw
    /// directory and the canonical content directory
    pub async fn remove(&self) -> PackserveResult<()> {
        for dir in [&self.dir, &self.content_dir] {
            match fs::remove_dir_all(dir).await {
                Ok(()) => debug!("removed {}", dir.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(PackserveError::io(format!("removing {}", dir.display()), e))
                }
            }
        }
        Ok(())
    }
}
