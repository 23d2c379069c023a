//! Package archive access
//!
//! Opens a package zip and supports two operations: reading the
//! distinguished manifest member and extracting selected members into a
//! destination directory. The archive is never mutated.
//!
//! Zip readers are blocking, so every operation re-opens the file inside
//! `spawn_blocking` rather than holding a reader across awaits.

use crate::error::{PackserveError, PackserveResult};
use crate::package::manifest::PackageManifest;
use crate::package::MANIFEST_MEMBER;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// Handle to a package zip on disk
#[derive(Debug, Clone)]
pub struct PackageArchive {
    path: PathBuf,
}

impl PackageArchive {
    /// Open a package archive, validating that the file exists
    pub fn open(path: impl Into<PathBuf>) -> PackserveResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(PackserveError::archive(&path, "file does not exist"));
        }
        Ok(Self { path })
    }

    /// Path of the underlying zip file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the manifest member
    pub async fn read_manifest(&self) -> PackserveResult<PackageManifest> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_manifest_blocking(&path))
            .await
            .map_err(|e| PackserveError::io("joining archive task", std::io::Error::other(e)))?
    }

    /// Extract the given members into `dest`, preserving their
    /// archive-internal relative paths.
    ///
    /// Any missing member fails the whole call.
    pub async fn extract(&self, members: &[String], dest: &Path) -> PackserveResult<()> {
        let path = self.path.clone();
        let members = members.to_vec();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || extract_blocking(&path, &members, &dest))
            .await
            .map_err(|e| PackserveError::io("joining archive task", std::io::Error::other(e)))?
    }
}

fn open_reader(path: &Path) -> PackserveResult<ZipArchive<File>> {
    let file = File::open(path).map_err(|e| PackserveError::archive(path, e.to_string()))?;
    ZipArchive::new(file).map_err(|e| PackserveError::archive(path, e.to_string()))
}

fn read_manifest_blocking(path: &Path) -> PackserveResult<PackageManifest> {
    let mut archive = open_reader(path)?;

    // Case-insensitive match on the root-level manifest member
    let member_name = archive
        .file_names()
        .find(|name| name.eq_ignore_ascii_case(MANIFEST_MEMBER))
        .map(String::from)
        .ok_or_else(|| PackserveError::ManifestMissing(path.to_path_buf()))?;

    let mut member = archive
        .by_name(&member_name)
        .map_err(|e| PackserveError::archive(path, e.to_string()))?;

    let mut content = String::new();
    member
        .read_to_string(&mut content)
        .map_err(|e| PackserveError::io(format!("reading manifest from {}", path.display()), e))?;

    PackageManifest::parse(&content, path)
}

fn extract_blocking(path: &Path, members: &[String], dest: &Path) -> PackserveResult<()> {
    let mut archive = open_reader(path)?;

    for name in members {
        // Manifests produced on Windows sometimes list members with
        // backslashes; zip member names always use '/'
        let lookup = name.replace('\\', "/");
        let mut member = archive
            .by_name(&lookup)
            .map_err(|e| PackserveError::extract(name, e.to_string()))?;

        // Reject entries that would escape the destination
        let relative = member
            .enclosed_name()
            .ok_or_else(|| PackserveError::extract(name, "unsafe member path"))?;
        let target = dest.join(relative);

        if member.is_dir() {
            std::fs::create_dir_all(&target)
                .map_err(|e| PackserveError::io(format!("creating {}", target.display()), e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PackserveError::io(format!("creating {}", parent.display()), e))?;
        }

        let mut out = File::create(&target)
            .map_err(|e| PackserveError::io(format!("creating {}", target.display()), e))?;
        std::io::copy(&mut member, &mut out)
            .map_err(|e| PackserveError::extract(name, e.to_string()))?;

        debug!("extracted {} -> {}", name, target.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, members: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        for (name, body) in members {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    const MANIFEST: &str = r#"{
        "uid": "pkg1",
        "content": {
            "files": [{"filename": "files/doc.txt"}],
            "images": [{"type": "cover", "src": "images/cover.png"}]
        }
    }"#;

    #[test]
    fn open_missing_archive_errors() {
        let temp = TempDir::new().unwrap();
        let result = PackageArchive::open(temp.path().join("nope.zip"));
        assert!(matches!(result, Err(PackserveError::Archive { .. })));
    }

    #[tokio::test]
    async fn read_manifest_from_archive() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("pkg1.zip");
        write_zip(&zip_path, &[("package.json", MANIFEST)]);

        let archive = PackageArchive::open(&zip_path).unwrap();
        let manifest = archive.read_manifest().await.unwrap();
        assert_eq!(manifest.uid, "pkg1");
        assert_eq!(manifest.content.files[0].filename, "files/doc.txt");
    }

    #[tokio::test]
    async fn read_manifest_case_insensitive() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("pkg1.zip");
        write_zip(&zip_path, &[("Package.JSON", MANIFEST)]);

        let archive = PackageArchive::open(&zip_path).unwrap();
        assert_eq!(archive.read_manifest().await.unwrap().uid, "pkg1");
    }

    #[tokio::test]
    async fn missing_manifest_errors() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("bare.zip");
        write_zip(&zip_path, &[("readme.txt", "hello")]);

        let archive = PackageArchive::open(&zip_path).unwrap();
        let result = archive.read_manifest().await;
        assert!(matches!(result, Err(PackserveError::ManifestMissing(_))));
    }

    #[tokio::test]
    async fn malformed_manifest_errors() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("bad.zip");
        write_zip(&zip_path, &[("package.json", "{broken")]);

        let archive = PackageArchive::open(&zip_path).unwrap();
        let result = archive.read_manifest().await;
        assert!(matches!(result, Err(PackserveError::ManifestParse { .. })));
    }

    #[tokio::test]
    async fn extract_members_preserves_relative_paths() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("pkg1.zip");
        write_zip(
            &zip_path,
            &[
                ("package.json", MANIFEST),
                ("files/root/a.txt", "alpha"),
                ("files/root/b.txt", "beta"),
            ],
        );
        let dest = temp.path().join("out");

        let archive = PackageArchive::open(&zip_path).unwrap();
        archive
            .extract(
                &["files/root/a.txt".to_string(), "files/root/b.txt".to_string()],
                &dest,
            )
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.join("files/root/a.txt")).unwrap(),
            "alpha"
        );
        assert_eq!(
            std::fs::read_to_string(dest.join("files/root/b.txt")).unwrap(),
            "beta"
        );
    }

    #[tokio::test]
    async fn extract_single_member() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("pkg1.zip");
        write_zip(&zip_path, &[("images/cover.png", "not-really-a-png")]);
        let dest = temp.path().join("out");

        let archive = PackageArchive::open(&zip_path).unwrap();
        archive
            .extract(&["images/cover.png".to_string()], &dest)
            .await
            .unwrap();

        assert!(dest.join("images/cover.png").is_file());
    }

    #[tokio::test]
    async fn extract_missing_member_errors() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("pkg1.zip");
        write_zip(&zip_path, &[("files/doc.txt", "text")]);
        let dest = temp.path().join("out");

        let archive = PackageArchive::open(&zip_path).unwrap();
        let result = archive
            .extract(&["files/absent.txt".to_string()], &dest)
            .await;
        assert!(matches!(result, Err(PackserveError::Extract { .. })));
    }

    #[tokio::test]
    async fn extract_backslash_member_name() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("pkg1.zip");
        write_zip(&zip_path, &[("files/doc.txt", "text")]);
        let dest = temp.path().join("out");

        let archive = PackageArchive::open(&zip_path).unwrap();
        archive
            .extract(&["files\\doc.txt".to_string()], &dest)
            .await
            .unwrap();
        assert!(dest.join("files/doc.txt").is_file());
    }
}
