//! `bd open` — check out (when needed) and open a branch in an editor.
//!
//! Worktree branches open at their checkout path without touching the
//! primary working directory; plain branches are checked out first unless
//! already current.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

use crate::config::UserConfig;
use crate::git::Repository;

pub fn run(
    repo: &Repository,
    branch: &str,
    with: Option<&str>,
    config: &UserConfig,
) -> anyhow::Result<()> {
    let items = repo.branches_and_worktrees()?;
    let Some(item) = items.iter().find(|i| i.name == branch) else {
        bail!("no such branch: {branch}");
    };

    let target: PathBuf = match &item.worktree_path {
        Some(path) => path.clone(),
        None => {
            if !item.is_current {
                repo.checkout(&item.name)?;
                eprintln!("Switched to {}", item.name);
            }
            repo.path().to_path_buf()
        }
    };

    let editor = with
        .or(config.default_open.as_deref())
        .context("no editor given; pass --with or set default-open in config")?;
    let command = config.open_command(editor)?;
    launch(&command, &target)
}

/// Launch an editor command with the target directory appended. Editors
/// detach on their own, so this bypasses the subprocess timeout.
pub(crate) fn launch(command: &[String], target: &Path) -> anyhow::Result<()> {
    let (program, args) = command
        .split_first()
        .context("empty editor command")?;

    log::debug!("launching {program} {args:?} {}", target.display());
    let status = std::process::Command::new(program)
        .args(args)
        .arg(target)
        .status()
        .with_context(|| format!("failed to launch {program}"))?;

    if !status.success() {
        bail!("{program} exited with {status}");
    }
    Ok(())
}
