//! Shared test setup: real git repos in temp directories with an isolated
//! git environment, so host configuration never leaks into assertions.

// Not every test binary uses every helper
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Run `git` in a directory, panicking with full output on failure.
pub fn git(current_dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(current_dir)
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .unwrap_or_else(|e| panic!("failed to run git {args:?}: {e}"));

    if !output.status.success() {
        panic!(
            "git {args:?} failed\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

/// Create a repo with one commit on `main`, identity configured locally.
pub fn init_repo(repo_dir: &Path) {
    std::fs::create_dir_all(repo_dir).unwrap();
    git(repo_dir, &["init", "-b", "main"]);
    git(repo_dir, &["config", "user.name", "Test User"]);
    git(repo_dir, &["config", "user.email", "test@example.com"]);

    std::fs::write(repo_dir.join("README.md"), "hello\n").unwrap();
    git(repo_dir, &["add", "README.md"]);
    git(repo_dir, &["commit", "-m", "initial"]);
}

/// A `bd` invocation with HOME pointed at the temp dir and git config
/// isolated, so neither the host's ~/.gitconfig nor its branchdeck config
/// can affect the test.
pub fn bd(tmp: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("bd");
    cmd.env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("xdg-config"))
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .env("GIT_CONFIG_NOSYSTEM", "1");
    cmd
}

/// Write a branchdeck config file into the temp dir and return its path.
pub fn write_config(tmp: &TempDir, contents: &str) -> PathBuf {
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}
