//! List command - list indexed packages

use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::PackserveResult;
use crate::index::DataDirIndex;
use crate::package::PackageManifest;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> PackserveResult<()> {
    let index = DataDirIndex::new(&config.storage.data_dir);
    index.refresh().await?;

    let mut packages = index.packages().await;
    packages.sort_by(|a, b| a.uid.cmp(&b.uid));

    if packages.is_empty() {
        println!("No packages found in {}", config.storage.data_dir.display());
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&packages),
        OutputFormat::Json => print_json(&packages)?,
        OutputFormat::Plain => print_plain(&packages),
    }

    Ok(())
}

fn print_table(packages: &[PackageManifest]) {
    println!("{:<24} {:<32} {:>6} {:>7}", "UID", "ARCHIVE", "FILES", "IMAGES");
    println!("{}", "-".repeat(72));

    for pkg in packages {
        println!(
            "{:<24} {:<32} {:>6} {:>7}",
            pkg.uid,
            pkg.filename,
            pkg.content.files.len(),
            pkg.content.images.len()
        );
    }

    println!();
    println!("Total: {} package(s)", packages.len());
}

fn print_json(packages: &[PackageManifest]) -> PackserveResult<()> {
    println!("{}", serde_json::to_string_pretty(packages)?);
    Ok(())
}

fn print_plain(packages: &[PackageManifest]) {
    for pkg in packages {
        println!("{}", pkg.uid);
    }
}
