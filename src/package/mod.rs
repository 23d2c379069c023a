//! Package model and archive access
//!
//! A package is a zip archive bundling a `package.json` manifest,
//! document files, and images. The manifest is the source of truth
//! for what the archive contains.

pub mod archive;
pub mod manifest;

pub use archive::PackageArchive;
pub use manifest::{FileEntry, ImageEntry, PackageContent, PackageManifest};

/// The distinguished manifest member inside every package archive
pub const MANIFEST_MEMBER: &str = "package.json";
