//! Content path flattening
//!
//! Package producers bundle multi-file content under an arbitrary
//! top-level folder beneath `files/`. Flattening finds the distinct
//! first-level directories so the cache can re-root content into a
//! stable canonical location when exactly one shared root exists.

use tracing::debug;

/// Collect the distinct first path segments following `prefix` across
/// all entries, preserving first-seen order.
///
/// Entries are normalized to forward slashes. An entry that does not
/// start with `prefix`, or has no deeper component after it, does not
/// match the expected shape and is skipped (logged, never an error).
pub fn top_level_dirs(entries: &[String], prefix: &str) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();

    for entry in entries {
        let normalized = entry.replace('\\', "/");

        let Some(rest) = normalized.strip_prefix(prefix) else {
            debug!("skipping entry outside '{}': {}", prefix, entry);
            continue;
        };

        // Only `prefix<segment>/...` counts; a bare file directly under
        // the prefix has no top-level directory to report
        let Some((segment, _)) = rest.split_once('/') else {
            debug!("skipping entry with no subdirectory: {}", entry);
            continue;
        };

        if segment.is_empty() {
            debug!("skipping entry with empty segment: {}", entry);
            continue;
        }

        if !result.iter().any(|s| s == segment) {
            result.push(segment.to_string());
        }
    }

    result
}
