//! Disk-backed content cache
//!
//! The cache satisfies resolution requests for a package's metadata,
//! primary content, or a derived image. Population is lazy: the first
//! request for an artifact extracts the minimum necessary members from
//! the source archive into the cache tree; subsequent requests are pure
//! filesystem hits. The cache tree itself is the only index — presence
//! of a record's `package.json` means the package is known.
//!
//! Population is serialized per cache key, so concurrent misses for the
//! same artifact collapse into one extraction and every waiter observes
//! the finished result.

pub mod flatten;
pub mod image;
pub mod record;

pub use self::image::{derived_path, ImageDeriver, RasterDeriver, SizeSpec};
pub use self::record::{CacheRecord, CONTENT_DIR, FILES_PREFIX};

use crate::error::{PackserveError, PackserveResult};
use crate::index::PackageIndex;
use crate::package::manifest::PackageManifest;
use crate::package::PackageArchive;
use self::flatten::top_level_dirs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A normalized resolution request
#[derive(Debug, Clone)]
pub enum ResolveKind {
    /// The package manifest itself
    Metadata,

    /// A named image, optionally resized
    Image {
        name: String,
        size: Option<SizeSpec>,
    },

    /// The package's primary content
    Content,
}

impl ResolveKind {
    fn cache_key(&self, uid: &str) -> String {
        match self {
            Self::Metadata => format!("{uid}/metadata"),
            Self::Image { name, size } => match size {
                Some(s) => format!("{uid}/image/{name}/{s}"),
                None => format!("{uid}/image/{name}"),
            },
            Self::Content => format!("{uid}/content"),
        }
    }
}

/// The resolved result of a request
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The manifest, for metadata requests
    Metadata(PackageManifest),

    /// A single file artifact
    File(PathBuf),

    /// A directory artifact
    Folder(PathBuf),
}

impl Resolution {
    /// Artifact path, when the resolution is a file or folder
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Metadata(_) => None,
            Self::File(p) | Self::Folder(p) => Some(p),
        }
    }
}

/// Orchestrates cache population and resolution
pub struct ContentCache {
    cache_root: PathBuf,
    data_dir: PathBuf,
    index: Arc<dyn PackageIndex>,
    deriver: Arc<dyn ImageDeriver>,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ContentCache {
    /// Create a cache rooted at `cache_root`, reading archives from
    /// `data_dir` via `index` and deriving images with `deriver`
    pub fn new(
        cache_root: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        index: Arc<dyn PackageIndex>,
        deriver: Arc<dyn ImageDeriver>,
    ) -> Self {
        Self {
            cache_root: cache_root.into(),
            data_dir: data_dir.into(),
            index,
            deriver,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// The cache root directory
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Record handle for `uid`
    pub fn record(&self, uid: &str) -> CacheRecord {
        CacheRecord::new(&self.cache_root, uid)
    }

    /// Resolve a request to an artifact, populating the cache on miss.
    ///
    /// Population for the same `(uid, kind)` key is single-flight: the
    /// first requester does the work while concurrent requesters wait
    /// and then hit the populated cache.
    pub async fn resolve(&self, uid: &str, kind: ResolveKind) -> PackserveResult<Resolution> {
        let key = kind.cache_key(uid);
        let lock = self.population_lock(&key).await;
        let guard = lock.lock().await;

        let result = match &kind {
            ResolveKind::Metadata => self
                .ensure_manifest_cached(uid)
                .await
                .map(Resolution::Metadata),
            ResolveKind::Image { name, size } => self.resolve_image(uid, name, *size).await,
            ResolveKind::Content => self.resolve_content(uid).await,
        };

        drop(guard);
        self.inflight.lock().await.remove(&key);
        result
    }

    /// Return the manifest for `uid`, caching it on first access.
    ///
    /// This is the only place a new cache record is created.
    pub async fn ensure_manifest_cached(&self, uid: &str) -> PackserveResult<PackageManifest> {
        let record = self.record(uid);
        if record.exists() {
            return record.read_manifest().await;
        }

        let entry = self.index.lookup(uid).await?;
        let archive = PackageArchive::open(self.data_dir.join(&entry.filename))?;
        let mut manifest = archive.read_manifest().await?;
        if manifest.filename.is_empty() {
            manifest.filename = entry.filename.clone();
        }

        record.write_manifest(&manifest).await?;
        info!("cached package {} from {}", uid, entry.filename);
        Ok(manifest)
    }

    /// Explicit teardown for a package that was deleted or updated at
    /// the source
    pub async fn remove(&self, uid: &str) -> PackserveResult<()> {
        self.record(uid).remove().await?;
        info!("removed cache for {}", uid);
        Ok(())
    }

    /// Drop any cached state for `uid` and re-cache its manifest
    pub async fn refresh(&self, uid: &str) -> PackserveResult<PackageManifest> {
        self.remove(uid).await?;
        self.ensure_manifest_cached(uid).await
    }

    async fn population_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        inflight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Open the source archive backing a cached manifest
    async fn archive_for(&self, manifest: &PackageManifest) -> PackserveResult<PackageArchive> {
        let filename = if manifest.filename.is_empty() {
            self.index.lookup(&manifest.uid).await?.filename
        } else {
            manifest.filename.clone()
        };
        PackageArchive::open(self.data_dir.join(filename))
    }

    async fn resolve_image(
        &self,
        uid: &str,
        name: &str,
        size: Option<SizeSpec>,
    ) -> PackserveResult<Resolution> {
        let manifest = self.ensure_manifest_cached(uid).await?;

        let image = manifest
            .image_named(name)
            .ok_or_else(|| PackserveError::ContentNotFound {
                uid: uid.to_string(),
                name: name.to_string(),
            })?;

        let record = self.record(uid);
        let img_path = record.member_path(&image.src);

        if !img_path.is_file() {
            let archive = self.archive_for(&manifest).await?;
            archive.extract(&[image.src.clone()], record.dir()).await?;
            debug!("extracted image {} for {}", image.src, uid);
        }

        self.resolve_sized(&img_path, size).await
    }

    /// Apply size derivation to an extracted image.
    ///
    /// When the derived variant already exists on disk the original is
    /// served; the variant's presence only marks the size as handled.
    /// This mirrors the long-observed serving behavior and is kept
    /// deliberately until stakeholders decide the variant should win.
    async fn resolve_sized(
        &self,
        src: &Path,
        size: Option<SizeSpec>,
    ) -> PackserveResult<Resolution> {
        let Some(size) = size else {
            return Ok(Resolution::File(src.to_path_buf()));
        };

        let derived = derived_path(src, &size);
        if derived.is_file() {
            return Ok(Resolution::File(src.to_path_buf()));
        }

        match self.deriver.derive(src, size, &derived).await {
            Ok(()) => {
                debug!("derived {}", derived.display());
                Ok(Resolution::File(derived))
            }
            Err(e) => {
                // A missing thumbnail is less severe than a missing
                // asset: degrade to the original
                warn!("image derivation failed, serving original: {}", e);
                Ok(Resolution::File(src.to_path_buf()))
            }
        }
    }

    async fn resolve_content(&self, uid: &str) -> PackserveResult<Resolution> {
        let manifest = self.ensure_manifest_cached(uid).await?;
        let record = self.record(uid);
        let files = &manifest.content.files;

        match files.len() {
            0 => Err(PackserveError::ContentNotFound {
                uid: uid.to_string(),
                name: "content".to_string(),
            }),
            1 => self.resolve_single_file(&manifest, &record).await,
            _ => self.resolve_multi_file(&manifest, &record).await,
        }
    }

    async fn resolve_single_file(
        &self,
        manifest: &PackageManifest,
        record: &CacheRecord,
    ) -> PackserveResult<Resolution> {
        let file = &manifest.content.files[0];
        let full = record.member_path(&file.filename);

        if !full.is_file() {
            let archive = self.archive_for(manifest).await?;
            archive
                .extract(&[file.filename.clone()], record.dir())
                .await?;
            debug!("extracted {} for {}", file.filename, manifest.uid);
        }

        Ok(Resolution::File(full))
    }

    async fn resolve_multi_file(
        &self,
        manifest: &PackageManifest,
        record: &CacheRecord,
    ) -> PackserveResult<Resolution> {
        let members: Vec<String> = manifest
            .content
            .files
            .iter()
            .map(|f| f.filename.clone())
            .collect();
        let normalized: Vec<String> = members.iter().map(|m| m.replace('\\', "/")).collect();

        let content_dir = record.content_dir().to_path_buf();

        let all_cached = normalized.iter().all(|m| record.member_path(m).is_file());
        if all_cached && content_dir.is_dir() {
            return Ok(Resolution::Folder(content_dir));
        }

        if !all_cached {
            let archive = self.archive_for(manifest).await?;
            archive.extract(&members, record.dir()).await?;
            debug!("extracted {} member(s) for {}", members.len(), manifest.uid);
        }

        // Re-root content out of the producer's arbitrary top-level
        // folder when exactly one exists
        let files_root = record.dir().join("files");
        let roots = top_level_dirs(&normalized, FILES_PREFIX);
        let from = if roots.len() == 1 {
            files_root.join(&roots[0])
        } else {
            files_root
        };

        replace_dir(&from, &content_dir).await?;
        info!(
            "flattened content for {} into {}",
            manifest.uid,
            content_dir.display()
        );
        Ok(Resolution::Folder(content_dir))
    }
}

/// Replace `dest` with a recursive copy of `src`
async fn replace_dir(src: &Path, dest: &Path) -> PackserveResult<()> {
    match fs::remove_dir_all(dest).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(PackserveError::io(format!("clearing {}", dest.display()), e)),
    }
    copy_dir(src, dest).await
}

fn copy_dir<'a>(
    src: &'a Path,
    dest: &'a Path,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = PackserveResult<()>> + Send + 'a>> {
    Box::pin(async move {
        fs::create_dir_all(dest)
            .await
            .map_err(|e| PackserveError::io(format!("creating {}", dest.display()), e))?;

        let mut entries = fs::read_dir(src)
            .await
            .map_err(|e| PackserveError::io(format!("reading {}", src.display()), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PackserveError::io(format!("iterating {}", src.display()), e))?
        {
            let from = entry.path();
            let to = dest.join(entry.file_name());
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| PackserveError::io(format!("stat {}", from.display()), e))?;

            if file_type.is_dir() {
                copy_dir(&from, &to).await?;
            } else {
                fs::copy(&from, &to)
                    .await
                    .map_err(|e| PackserveError::io(format!("copying {}", from.display()), e))?;
            }
        }

        Ok(())
    })
}
