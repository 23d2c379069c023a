//! CLI command implementations

pub mod cache;
pub mod config;
pub mod list;
pub mod resolve;

pub use cache::execute as cache;
pub use config::execute as config;
pub use list::execute as list;
pub use resolve::execute as resolve;

use crate::cache::{ContentCache, RasterDeriver};
use crate::config::Config;
use crate::index::DataDirIndex;
use std::sync::Arc;

/// Build the content cache and its collaborators from configuration
pub fn build_cache(config: &Config) -> ContentCache {
    let index = Arc::new(DataDirIndex::new(&config.storage.data_dir));
    ContentCache::new(
        &config.storage.cache_dir,
        &config.storage.data_dir,
        index,
        Arc::new(RasterDeriver),
    )
}
