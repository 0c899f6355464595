//! ghq root resolution and hostname/org/repo listing.
//!
//! Repositories are organized as `<root>/<hostname>/<org>/<repo>`. The root
//! comes from a config override, the `ghq root` command, or a `~/ghq`
//! fallback, in that order. Hostname and org listings apply preferred-first
//! ordering from injected preference lists.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::Serialize;

use crate::shell_exec;

/// A repository on disk under the ghq root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GitRepo {
    pub name: String,
    pub full_path: PathBuf,
}

/// Resolve the ghq root directory.
///
/// A configured override wins; otherwise `ghq root` is consulted and its
/// answer accepted only if the directory exists; otherwise `~/ghq`. A failed
/// or missing `ghq` binary is not an error — only the fallback chain running
/// dry is.
pub fn resolve_root(override_root: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(root) = override_root {
        let root = expand_tilde(root)?;
        if root.is_dir() {
            return Ok(root);
        }
        bail!("configured ghq root does not exist: {}", root.display());
    }

    if let Ok(stdout) = shell_exec::run("ghq root", None) {
        if !stdout.is_empty() {
            let root = PathBuf::from(&stdout);
            if root.is_dir() {
                return Ok(root);
            }
        }
    }

    let fallback = home_dir()?.join("ghq");
    if fallback.is_dir() {
        return Ok(fallback);
    }

    bail!("ghq root not found; install ghq or create ~/ghq")
}

/// List visible subdirectory names of `dir`, sorted. Hidden entries (names
/// starting with `.`) are excluded; an absent path yields an empty list.
pub fn list_directories(dir: &Path) -> anyhow::Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }

    names.sort();
    Ok(names)
}

/// Order `items` with the preferred subset first.
///
/// Preferred items actually present come first, in the exact order given
/// (absent preferred items are skipped, never invented); the remaining items
/// follow in byte-wise `str` order. No locale collation is applied, so
/// non-ASCII directory names sort by code point, not alphabet.
pub fn sort_with_preferred(items: Vec<String>, preferred: &[String]) -> Vec<String> {
    let preferred_set: HashSet<&str> = preferred.iter().map(String::as_str).collect();

    let mut out: Vec<String> = preferred
        .iter()
        .filter(|p| items.contains(p))
        .cloned()
        .collect();

    let mut rest: Vec<String> = items
        .into_iter()
        .filter(|item| !preferred_set.contains(item.as_str()))
        .collect();
    rest.sort();

    out.extend(rest);
    out
}

/// List hostname directories under the ghq root, preferred-first.
pub fn list_hostnames(root: &Path, preferred: &[String]) -> anyhow::Result<Vec<String>> {
    Ok(sort_with_preferred(list_directories(root)?, preferred))
}

/// List org directories under a hostname, preferred-first.
pub fn list_orgs(root: &Path, hostname: &str, preferred: &[String]) -> anyhow::Result<Vec<String>> {
    Ok(sort_with_preferred(
        list_directories(&root.join(hostname))?,
        preferred,
    ))
}

/// List repositories under `<root>/<hostname>/<org>`, sorted by name.
pub fn list_repos(root: &Path, hostname: &str, org: &str) -> anyhow::Result<Vec<GitRepo>> {
    let dir = root.join(hostname).join(org);
    Ok(list_directories(&dir)?
        .into_iter()
        .map(|name| {
            let full_path = dir.join(&name);
            GitRepo { name, full_path }
        })
        .collect())
}

fn expand_tilde(path: &Path) -> anyhow::Result<PathBuf> {
    let Some(s) = path.to_str() else {
        return Ok(path.to_path_buf());
    };
    if s == "~" {
        return home_dir();
    }
    if let Some(rest) = s.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }
    Ok(path.to_path_buf())
}

fn home_dir() -> anyhow::Result<PathBuf> {
    home::home_dir().context("cannot determine home directory")
}
