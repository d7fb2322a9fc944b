use std::fs;
use std::path::Path;

use bookmark_core::db::ProjectLayout;
use predicates::prelude::*;
use tempfile::tempdir;

fn bookmarks_cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("binary-bookmarks")
}

/// Create a project with one registered binary named `app`.
fn project_with_binary(root: &Path) {
    bookmarks_cmd()
        .args(["init-project", "--name", "Cli"])
        .arg("--root")
        .arg(root)
        .assert()
        .success();
    fs::write(root.join("app.bin"), b"not really an executable").unwrap();
    bookmarks_cmd()
        .args(["add-binary", "--path", "app.bin", "--name", "app", "--skip-hash"])
        .arg("--root")
        .arg(root)
        .assert()
        .success();
}

fn add(root: &Path, address: &str, label: &str) -> assert_cmd::assert::Assert {
    bookmarks_cmd()
        .args(["add", "--binary", "app", "--address", address, "--label", label])
        .arg("--root")
        .arg(root)
        .assert()
}

fn list(root: &Path) -> assert_cmd::assert::Assert {
    bookmarks_cmd().args(["list", "--binary", "app"]).arg("--root").arg(root).assert()
}

/// A subcommand is required.
#[test]
fn missing_subcommand_fails() {
    bookmarks_cmd().assert().failure();
}

/// init-project without an explicit --root should use the current directory.
#[test]
fn init_project_uses_default_root_when_not_provided() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();

    bookmarks_cmd()
        .current_dir(root)
        .arg("init-project")
        .arg("--name")
        .arg("TestProject")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized bookmarks project"));

    let layout = ProjectLayout::new(root);
    assert!(
        layout.project_config_path.exists(),
        "project config should exist at {}",
        layout.project_config_path.display()
    );
}

/// project-info should fail (non-zero exit) if no project config exists.
#[test]
fn project_info_fails_when_config_missing() {
    let dir = tempdir().expect("tempdir");
    bookmarks_cmd()
        .arg("project-info")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read bookmarks project config"));
}

#[test]
fn add_binary_fails_for_missing_file() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    bookmarks_cmd().arg("init-project").arg("--root").arg(root).assert().success();

    bookmarks_cmd()
        .args(["add-binary", "--path", "nonexistent.bin"])
        .arg("--root")
        .arg(root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Binary file does not exist"));
}

#[test]
fn bookmarks_are_listed_in_address_order() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    project_with_binary(root);

    add(root, "0x1000", "start").success().stdout(predicate::str::contains("Row: 0"));
    add(root, "0x500", "early").success().stdout(predicate::str::contains("Row: 0"));
    add(root, "4096", "again").success().stdout(predicate::str::contains("Row: 2"));

    list(root).success().stdout(
        predicate::str::contains("[0] 00000500 early")
            .and(predicate::str::contains("[1] 00001000 start"))
            .and(predicate::str::contains("[2] 00001000 again")),
    );
}

#[test]
fn rename_remove_and_goto_act_on_rows() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    project_with_binary(root);
    add(root, "0x10", "a").success();
    add(root, "0x20", "b").success();

    bookmarks_cmd()
        .args(["rename", "--binary", "app", "--row", "1", "--label", "bee"])
        .arg("--root")
        .arg(root)
        .assert()
        .success();
    bookmarks_cmd()
        .args(["goto", "--binary", "app", "--row", "1"])
        .arg("--root")
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cursor: 0x20 (bee)"));
    bookmarks_cmd()
        .args(["remove", "--binary", "app", "--row", "0"])
        .arg("--root")
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed bookmark 0x10 a"));

    let remaining = predicate::str::contains("[0] 00000020 bee");
    list(root).success().stdout(remaining.and(predicate::str::contains("00000010").not()));
}

#[test]
fn out_of_range_rows_fail_cleanly() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    project_with_binary(root);

    for sub in ["remove", "goto"] {
        bookmarks_cmd()
            .args([sub, "--binary", "app", "--row", "3"])
            .arg("--root")
            .arg(root)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Row 3 does not exist (0 bookmarks)"));
    }
}

#[test]
fn invalid_input_is_rejected() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    project_with_binary(root);

    add(root, "0xnope", "x").failure().stderr(predicate::str::contains("Invalid address"));
    add(root, "0x10", "").failure().stderr(predicate::str::contains("must not be empty"));
    bookmarks_cmd()
        .args(["list", "--binary", "ghost"])
        .arg("--root")
        .arg(root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Binary 'ghost' is not registered"));
}

#[test]
fn list_json_emits_rows_with_spans() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    project_with_binary(root);
    add(root, "0x42", "answer").success();

    let output = bookmarks_cmd()
        .args(["list", "--binary", "app", "--json"])
        .arg("--root")
        .arg(root)
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["address"], 0x42);
    assert_eq!(rows[0]["label"], "answer");
    assert_eq!(rows[0]["lines"][0]["spans"][0]["text"], "00000042");
}
