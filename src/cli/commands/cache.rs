//! Cache command - inspect and tear down cached packages

use crate::cache::{CacheRecord, CONTENT_DIR};
use crate::cli::args::{CacheAction, CacheArgs};
use crate::cli::commands::build_cache;
use crate::config::Config;
use crate::error::{PackserveError, PackserveResult};
use chrono::{DateTime, Utc};
use console::style;
use std::path::Path;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> PackserveResult<()> {
    match args.action {
        CacheAction::Status => status(config).await,
        CacheAction::Remove { uid } => remove(&uid, config).await,
        CacheAction::Refresh { uid } => refresh(&uid, config).await,
    }
}

async fn status(config: &Config) -> PackserveResult<()> {
    let cache_root = &config.storage.cache_dir;

    if !cache_root.is_dir() {
        println!("Cache is empty ({} does not exist)", cache_root.display());
        return Ok(());
    }

    let cached = cached_uids(cache_root).await?;

    if cached.is_empty() {
        println!("No cached packages under {}", cache_root.display());
        return Ok(());
    }

    println!(
        "{:<24} {:<10} {:<10} {:<18}",
        "UID", "MANIFEST", "CONTENT", "CACHED"
    );
    println!("{}", "-".repeat(64));

    for uid in &cached {
        let record = CacheRecord::new(cache_root, uid);
        let manifest = if record.exists() {
            style("yes").green().to_string()
        } else {
            style("no").dim().to_string()
        };
        let content = if record.content_dir().is_dir() {
            style("yes").green().to_string()
        } else {
            style("-").dim().to_string()
        };
        let cached_at = cached_at(&record)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<24} {:<10} {:<10} {:<18}", uid, manifest, content, cached_at);
    }

    println!();
    println!("Total: {} cached package(s)", cached.len());
    Ok(())
}

/// When the record's manifest copy was written
fn cached_at(record: &CacheRecord) -> Option<DateTime<Utc>> {
    let modified = std::fs::metadata(record.manifest_path())
        .ok()?
        .modified()
        .ok()?;
    Some(DateTime::from(modified))
}

/// Package directories directly under the cache root, skipping the
/// canonical content area
async fn cached_uids(cache_root: &Path) -> PackserveResult<Vec<String>> {
    let mut uids = Vec::new();

    let mut entries = tokio::fs::read_dir(cache_root)
        .await
        .map_err(|e| PackserveError::io(format!("reading {}", cache_root.display()), e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| PackserveError::io("iterating cache root", e))?
    {
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == CONTENT_DIR {
            continue;
        }
        uids.push(name);
    }

    uids.sort();
    Ok(uids)
}

async fn remove(uid: &str, config: &Config) -> PackserveResult<()> {
    let cache = build_cache(config);
    cache.remove(uid).await?;
    println!("{} removed cache for {}", style("✓").green(), uid);
    Ok(())
}

async fn refresh(uid: &str, config: &Config) -> PackserveResult<()> {
    let cache = build_cache(config);
    let manifest = cache.refresh(uid).await?;
    println!(
        "{} re-cached {} from {}",
        style("✓").green(),
        uid,
        manifest.filename
    );
    Ok(())
}
