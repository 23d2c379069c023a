//! Resolve command - resolve a package artifact out of the cache

use crate::cache::{Resolution, ResolveKind, SizeSpec};
use crate::cli::args::{KindArg, ResolveArgs};
use crate::cli::commands::build_cache;
use crate::config::Config;
use crate::error::{PackserveError, PackserveResult};
use console::style;

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, config: &Config) -> PackserveResult<()> {
    let kind = normalize(&args)?;
    let cache = build_cache(config);

    let resolution = cache.resolve(&args.uid, kind).await?;
    print_resolution(&resolution, args.json)
}

/// Normalize the loose CLI options into a structured request
fn normalize(args: &ResolveArgs) -> PackserveResult<ResolveKind> {
    match args.kind {
        KindArg::Metadata => Ok(ResolveKind::Metadata),
        KindArg::Content => Ok(ResolveKind::Content),
        KindArg::Image => {
            let name = args.name.clone().ok_or_else(|| {
                PackserveError::User("image requests need --name".to_string())
            })?;
            let size = args
                .size
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(str::parse::<SizeSpec>)
                .transpose()?;
            Ok(ResolveKind::Image { name, size })
        }
    }
}

fn print_resolution(resolution: &Resolution, json: bool) -> PackserveResult<()> {
    if json {
        let value = match resolution {
            Resolution::Metadata(manifest) => serde_json::json!({
                "kind": "metadata",
                "manifest": manifest,
            }),
            Resolution::File(path) => serde_json::json!({
                "kind": "file",
                "path": path,
            }),
            Resolution::Folder(path) => serde_json::json!({
                "kind": "folder",
                "path": path,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match resolution {
        Resolution::Metadata(manifest) => {
            println!("{}", serde_json::to_string_pretty(manifest)?);
        }
        Resolution::File(path) => {
            println!("{} {}", style("file").green(), path.display());
        }
        Resolution::Folder(path) => {
            println!("{} {}", style("folder").green(), path.display());
        }
    }
    Ok(())
}
