//! packserve - content package cache and resolver
//!
//! Serves versioned content packages (zip-archived bundles of a
//! manifest, document files, and images) from a disk-backed cache that
//! is populated lazily from the source archives.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod package;

pub use cache::{ContentCache, Resolution, ResolveKind};
pub use error::{PackserveError, PackserveResult};
