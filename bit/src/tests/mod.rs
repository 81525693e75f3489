//! end-to-end tests driving the `bit` binary itself, the way a user would
//! from a shell (spec.md §6 CLI surface)

use assert_cmd::Command;
use pretty_assertions::assert_eq;
use std::path::Path;

fn bit(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bit").unwrap();
    cmd.current_dir(dir);
    cmd.env("GIT_AUTHOR_NAME", "Test User");
    cmd.env("GIT_AUTHOR_EMAIL", "test@example.com");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    String::from_utf8(cmd.output().unwrap().stdout).unwrap()
}

#[test]
fn init_add_commit_then_cat_file_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    bit(tmp.path()).args(["init", "."]).assert().success();

    std::fs::write(tmp.path().join("hello.txt"), b"hi\n").unwrap();
    bit(tmp.path()).args(["add", "hello.txt"]).assert().success();
    bit(tmp.path()).args(["commit", "-m", "initial commit"]).assert().success();

    let commit_body = stdout_of(bit(tmp.path()).args(["cat-file", "-p", "HEAD"]));
    assert!(commit_body.contains("initial commit"));
    assert!(commit_body.starts_with("tree "));

    let tree_body = stdout_of(bit(tmp.path()).args(["ls-tree", "HEAD"]));
    assert!(tree_body.contains("hello.txt"));
}

#[test]
fn rev_parse_resolves_head_to_the_same_id_as_show_ref() {
    let tmp = tempfile::tempdir().unwrap();
    bit(tmp.path()).args(["init", "."]).assert().success();
    std::fs::write(tmp.path().join("a"), b"x").unwrap();
    bit(tmp.path()).args(["add", "a"]).assert().success();
    bit(tmp.path()).args(["commit", "-m", "c"]).assert().success();

    let head_oid = stdout_of(bit(tmp.path()).args(["rev-parse", "HEAD"])).trim().to_owned();
    let refs = stdout_of(bit(tmp.path()).args(["show-ref"]));
    assert!(refs.contains(&head_oid));
    assert!(refs.contains("refs/heads/master"));
}

#[test]
fn log_prints_every_ancestor_commit_message() {
    let tmp = tempfile::tempdir().unwrap();
    bit(tmp.path()).args(["init", "."]).assert().success();
    std::fs::write(tmp.path().join("a"), b"1").unwrap();
    bit(tmp.path()).args(["add", "a"]).assert().success();
    bit(tmp.path()).args(["commit", "-m", "first"]).assert().success();
    std::fs::write(tmp.path().join("a"), b"2").unwrap();
    bit(tmp.path()).args(["add", "a"]).assert().success();
    bit(tmp.path()).args(["commit", "-m", "second"]).assert().success();

    let log = stdout_of(bit(tmp.path()).args(["log"]));
    assert!(log.contains("first"));
    assert!(log.contains("second"));
}

#[test]
fn tag_then_checkout_materializes_the_tagged_tree() {
    let tmp = tempfile::tempdir().unwrap();
    bit(tmp.path()).args(["init", "."]).assert().success();
    std::fs::write(tmp.path().join("a"), b"x").unwrap();
    bit(tmp.path()).args(["add", "a"]).assert().success();
    bit(tmp.path()).args(["commit", "-m", "c"]).assert().success();
    bit(tmp.path()).args(["tag", "-a", "-m", "release", "v1.0", "HEAD"]).assert().success();

    bit(tmp.path()).args(["checkout", "v1.0", "out"]).assert().success();
    assert_eq!(std::fs::read(tmp.path().join("out").join("a")).unwrap(), b"x");
}

#[test]
fn cat_file_rejects_an_unknown_revision() {
    let tmp = tempfile::tempdir().unwrap();
    bit(tmp.path()).args(["init", "."]).assert().success();
    bit(tmp.path()).args(["cat-file", "-p", "deadbeef"]).assert().failure();
}

#[test]
fn ls_files_reflects_what_was_staged() {
    let tmp = tempfile::tempdir().unwrap();
    bit(tmp.path()).args(["init", "."]).assert().success();
    std::fs::write(tmp.path().join("a"), b"x").unwrap();
    std::fs::write(tmp.path().join("b"), b"y").unwrap();
    bit(tmp.path()).args(["add", "a", "b"]).assert().success();

    let files = stdout_of(bit(tmp.path()).args(["ls-files"]));
    assert_eq!(files.lines().collect::<Vec<_>>(), vec!["a", "b"]);
}
