//! Package manifest parsing
//!
//! Each archive carries a `package.json` member describing the package
//! identity and its file/image members. Manifests are immutable once
//! read; the cache stores a serialized copy as a read optimization.

use crate::error::{PackserveError, PackserveResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parsed package manifest from package.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package identifier
    pub uid: String,

    /// Archive filename this manifest was read from
    #[serde(default)]
    pub filename: String,

    /// File and image members
    #[serde(default)]
    pub content: PackageContent,
}

/// Content section of a manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageContent {
    /// Document members, in archive order
    #[serde(default)]
    pub files: Vec<FileEntry>,

    /// Image members, in archive order
    #[serde(default)]
    pub images: Vec<ImageEntry>,
}

/// A document member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Archive-internal relative path
    pub filename: String,
}

/// An image member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Image role, e.g. "cover" or "thumb" ("type" on the wire)
    #[serde(rename = "type")]
    pub kind: String,

    /// Archive-internal relative path
    pub src: String,
}

impl PackageManifest {
    /// Parse a manifest from a JSON string
    pub fn parse(content: &str, origin: &Path) -> PackserveResult<Self> {
        serde_json::from_str(content).map_err(|e| PackserveError::ManifestParse {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// First image entry with the given role, if any
    pub fn image_named(&self, name: &str) -> Option<&ImageEntry> {
        self.content.images.iter().find(|img| img.kind == name)
    }

    /// Whether the package bundles more than one document member
    pub fn is_multi_file(&self) -> bool {
        self.content.files.len() > 1
    }
}
