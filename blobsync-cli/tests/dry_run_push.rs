use std::fs;
use std::path::Path;

use assert_cmd::Command;
use blobsync_core::config::{self, Provider, StoreConfig};
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    home: TempDir,
    store: TempDir,
    remote: TempDir,
}

impl Env {
    fn new() -> Self {
        let env = Self {
            home: TempDir::new().unwrap(),
            store: TempDir::new().unwrap(),
            remote: TempDir::new().unwrap(),
        };
        fs::create_dir_all(env.artifact_root()).unwrap();
        fs::create_dir_all(env.source_cache().join("packs/tar.gz")).unwrap();
        config::save_store_config_at(
            env.home.path(),
            &StoreConfig {
                artifact_root: env.artifact_root(),
                source_cache: env.source_cache(),
            },
        )
        .expect("save store config");
        env
    }

    fn artifact_root(&self) -> std::path::PathBuf {
        self.store.path().join("bld")
    }

    fn source_cache(&self) -> std::path::PathBuf {
        self.store.path().join("src")
    }

    fn artifact(&self, package: &str, name: &str) {
        let dir = self.artifact_root().join(package).join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("out.bin"), name).unwrap();
    }

    fn add_remote(&self, name: &str) {
        config::add_remote_at(
            self.home.path(),
            name,
            Provider::Folder {
                root: self.remote.path().to_path_buf(),
            },
        )
        .expect("add remote");
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("blobsync").expect("blobsync binary");
        cmd.env("HOME", self.home.path())
            .env("USERPROFILE", self.home.path())
            .env("RUST_LOG", "warn");
        cmd
    }
}

fn write_json(path: &Path, json: &str) {
    fs::write(path, json).unwrap();
}

#[test]
fn dry_run_lists_skipping_then_pushing_then_hint() {
    let env = Env::new();
    env.artifact("pkgA", "art1");
    env.artifact("pkgA", "art2");
    write_json(
        &env.store.path().join("build_manifest.json"),
        r#"{"pkgA":{"art1":"deadbeef"}}"#,
    );

    let output = env
        .cmd()
        .args(["push", "--dry-run", "--objects", "build"])
        .output()
        .expect("run blobsync push --dry-run");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let skip = stdout.find("pkgA/art1 Skipping").expect("skipping line");
    let push = stdout.find("pkgA/art2 Pushing").expect("pushing line");
    let hint = stdout.find("Use --force to push all artifacts").expect("hint line");
    assert!(skip < push && push < hint, "{stdout}");

    assert!(!env.remote.path().join("bld").exists());
}

#[test]
fn dry_run_needs_no_remote() {
    let env = Env::new();
    fs::write(env.source_cache().join("packs/tar.gz/lib.tar.gz"), b"x").unwrap();

    env.cmd()
        .args(["push", "--dry-run", "--objects", "source"])
        .assert()
        .success()
        .stdout(predicate::str::contains("packs/tar.gz/lib.tar.gz Pushing"))
        .stdout(predicate::str::contains("Use --force to push skipped source packs"));
}

#[test]
fn push_uploads_to_folder_remote_and_is_idempotent() {
    let env = Env::new();
    env.artifact("pkgA", "art1");
    env.add_remote("primary");

    env.cmd()
        .args(["push", "--objects", "both"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pushed 1 artifacts"));

    assert!(env.remote.path().join("bld/pkgA/art1.tar.gz").is_file());
    assert!(env.remote.path().join("bld/build_manifest.json").is_file());
    assert!(env.store.path().join("build_manifest.json").is_file());

    env.cmd()
        .arg("push")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to push"));
}

#[test]
fn push_to_unknown_remote_explains_how_to_add_it() {
    let env = Env::new();

    env.cmd()
        .args(["push", "backup"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("blobsync remote add backup"));
}

#[test]
fn push_without_init_fails_with_hint() {
    let home = TempDir::new().unwrap();

    Command::cargo_bin("blobsync")
        .unwrap()
        .env("HOME", home.path())
        .env("USERPROFILE", home.path())
        .args(["push", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("blobsync init"));
}

#[test]
fn remote_add_then_show_json() {
    let env = Env::new();
    let root = env.remote.path().to_str().unwrap().to_string();

    env.cmd()
        .args(["remote", "add", "--root", &root])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remote 'primary'"));

    let output = env
        .cmd()
        .args(["remote", "show", "--json"])
        .output()
        .expect("run blobsync remote show --json");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["name"], "primary");
    assert_eq!(json[0]["provider"], "folder");
    assert_eq!(json[0]["default"], true);
}
