//! Derived image variants
//!
//! A derived image is a resized copy of an extracted original, keyed by
//! a `<width>x<height>` size spec and stored alongside the original as
//! `<basename>-<WxH><ext>`. Derivation failures are surfaced as errors
//! here; the cache layer degrades them to serving the original, since a
//! missing thumbnail is less severe than a missing asset.

use crate::error::{PackserveError, PackserveResult};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Target dimensions parsed from a `<width>x<height>` string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSpec {
    pub width: u32,
    pub height: u32,
}

impl FromStr for SizeSpec {
    type Err = PackserveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PackserveError::InvalidSizeFormat(s.to_string());

        let (w, h) = s.split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.parse().map_err(|_| invalid())?;
        let height: u32 = h.parse().map_err(|_| invalid())?;

        if width == 0 || height == 0 {
            return Err(invalid());
        }

        Ok(Self { width, height })
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Sibling path for a derived variant: `<basename>-<WxH><ext>`
pub fn derived_path(src: &Path, size: &SizeSpec) -> PathBuf {
    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = src
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    src.with_file_name(format!("{stem}-{size}{ext}"))
}

/// Produces resized image copies
#[async_trait]
pub trait ImageDeriver: Send + Sync {
    /// Write a resized copy of `src` at `dest` with the given dimensions
    async fn derive(&self, src: &Path, size: SizeSpec, dest: &Path) -> PackserveResult<()>;
}

/// Deriver backed by the `image` crate
///
/// Resizes with Lanczos3 and keeps the output format implied by the
/// destination extension.
#[derive(Debug, Default)]
pub struct RasterDeriver;

#[async_trait]
impl ImageDeriver for RasterDeriver {
    async fn derive(&self, src: &Path, size: SizeSpec, dest: &Path) -> PackserveResult<()> {
        let src = src.to_path_buf();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || derive_blocking(&src, size, &dest))
            .await
            .map_err(|e| PackserveError::io("joining image task", std::io::Error::other(e)))?
    }
}

fn derive_blocking(src: &Path, size: SizeSpec, dest: &Path) -> PackserveResult<()> {
    let img = image::open(src).map_err(|e| PackserveError::ImageDerive {
        path: src.to_path_buf(),
        reason: e.to_string(),
    })?;

    let resized = img.resize(size.width, size.height, image::imageops::FilterType::Lanczos3);

    resized.save(dest).map_err(|e| PackserveError::ImageDerive {
        path: dest.to_path_buf(),
        reason: e.to_string(),
    })
}
