//! Integration tests for packserve
//!
//! Each test builds a real package zip in a temp repository, points the
//! binary at it through a config file, and drives the CLI end to end.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

struct Repo {
    temp: TempDir,
}

impl Repo {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("data")).unwrap();
        let config = format!(
            "[storage]\ndata_dir = \"{}\"\ncache_dir = \"{}\"\n",
            temp.path().join("data").display(),
            temp.path().join("cache").display()
        );
        std::fs::write(temp.path().join("config.toml"), config).unwrap();
        Self { temp }
    }

    fn config_path(&self) -> std::path::PathBuf {
        self.temp.path().join("config.toml")
    }

    fn cache_root(&self) -> std::path::PathBuf {
        self.temp.path().join("cache")
    }

    fn write_package(&self, name: &str, manifest: &str, members: &[(&str, &str)]) {
        let path = self.temp.path().join("data").join(name);
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        writer
            .start_file("package.json", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(manifest.as_bytes()).unwrap();
        for (member, body) in members {
            writer
                .start_file(*member, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    fn packserve(&self) -> Command {
        let mut cmd = Command::cargo_bin("packserve").unwrap();
        cmd.arg("--config").arg(self.config_path());
        cmd
    }
}

const SINGLE_FILE: &str = r#"{
    "uid": "single",
    "content": {
        "files": [{"filename": "doc.pdf"}],
        "images": [{"type": "cover", "src": "images/cover.png"}]
    }
}"#;

const MULTI_FILE: &str = r#"{
    "uid": "multi",
    "content": {
        "files": [
            {"filename": "files/bundle/a.txt"},
            {"filename": "files/bundle/b.txt"}
        ],
        "images": []
    }
}"#;

#[test]
fn help_displays() {
    Command::cargo_bin("packserve")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("content package cache"));
}

#[test]
fn version_displays() {
    Command::cargo_bin("packserve")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("packserve"));
}

#[test]
fn config_show_prints_storage_section() {
    let repo = Repo::new();
    repo.packserve()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[storage]"));
}

#[test]
fn list_empty_repository() {
    let repo = Repo::new();
    repo.packserve()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No packages found"));
}

#[test]
fn list_shows_indexed_packages() {
    let repo = Repo::new();
    repo.write_package("single.zip", SINGLE_FILE, &[("doc.pdf", "pdf")]);

    repo.packserve()
        .args(["list", "--format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("single"));
}

#[test]
fn resolve_metadata_prints_manifest() {
    let repo = Repo::new();
    repo.write_package("single.zip", SINGLE_FILE, &[("doc.pdf", "pdf")]);

    repo.packserve()
        .args(["resolve", "single", "metadata"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"uid\": \"single\""));
}

#[test]
fn resolve_content_extracts_and_prints_path() {
    let repo = Repo::new();
    repo.write_package("single.zip", SINGLE_FILE, &[("doc.pdf", "pdf bytes")]);

    repo.packserve()
        .args(["resolve", "single", "content"])
        .assert()
        .success()
        .stdout(predicate::str::contains("doc.pdf"));

    let cached = repo.cache_root().join("single/doc.pdf");
    assert_eq!(std::fs::read_to_string(cached).unwrap(), "pdf bytes");
}

#[test]
fn resolve_multi_file_content_flattens() {
    let repo = Repo::new();
    repo.write_package(
        "multi.zip",
        MULTI_FILE,
        &[
            ("files/bundle/a.txt", "alpha"),
            ("files/bundle/b.txt", "beta"),
        ],
    );

    repo.packserve()
        .args(["resolve", "multi", "content", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"folder\""));

    let content = repo.cache_root().join("content/multi");
    assert!(content.join("a.txt").is_file());
    assert!(content.join("b.txt").is_file());
}

#[test]
fn resolve_image_without_size() {
    let repo = Repo::new();
    repo.write_package(
        "single.zip",
        SINGLE_FILE,
        &[("doc.pdf", "pdf"), ("images/cover.png", "png bytes")],
    );

    repo.packserve()
        .args(["resolve", "single", "image", "--name", "cover"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cover.png"));
}

#[test]
fn resolve_unknown_uid_fails() {
    let repo = Repo::new();
    repo.packserve()
        .args(["resolve", "nonexistent", "metadata"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Package not found"));
}

#[test]
fn resolve_unknown_image_name_fails() {
    let repo = Repo::new();
    repo.write_package("single.zip", SINGLE_FILE, &[("images/cover.png", "png")]);

    repo.packserve()
        .args(["resolve", "single", "image", "--name", "back"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No content named 'back'"));
}

#[test]
fn resolve_bad_size_fails() {
    let repo = Repo::new();
    repo.write_package("single.zip", SINGLE_FILE, &[("images/cover.png", "png")]);

    repo.packserve()
        .args([
            "resolve", "single", "image", "--name", "cover", "--size", "bad",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid size format"));
}

#[test]
fn cache_status_and_remove() {
    let repo = Repo::new();
    repo.write_package("single.zip", SINGLE_FILE, &[("doc.pdf", "pdf")]);

    repo.packserve()
        .args(["resolve", "single", "content"])
        .assert()
        .success();

    repo.packserve()
        .args(["cache", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("single"));

    repo.packserve()
        .args(["cache", "remove", "single"])
        .assert()
        .success();

    assert!(!repo.cache_root().join("single").exists());
}

#[test]
fn second_resolve_hits_cache_without_archive() {
    let repo = Repo::new();
    repo.write_package("single.zip", SINGLE_FILE, &[("doc.pdf", "pdf bytes")]);

    repo.packserve()
        .args(["resolve", "single", "content"])
        .assert()
        .success();

    std::fs::remove_file(repo.temp.path().join("data/single.zip")).unwrap();

    repo.packserve()
        .args(["resolve", "single", "content"])
        .assert()
        .success()
        .stdout(predicate::str::contains("doc.pdf"));
}
