//! Branch and worktree lifecycle actions: checkout, create, convert, delete.

use anyhow::{Context, bail};

use super::confirm;
use crate::git::{BranchKind, Repository};

pub fn checkout(repo: &Repository, branch: &str) -> anyhow::Result<()> {
    repo.checkout(branch)?;
    eprintln!("Switched to {branch}");
    Ok(())
}

/// Create a branch off `from` (default: the current branch) and switch to it.
pub fn create_branch(repo: &Repository, name: &str, from: Option<&str>) -> anyhow::Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("branch name is required");
    }

    let from = base_ref(repo, from)?;
    repo.create_branch(name, &from)?;
    eprintln!("Created and switched to {name}");
    Ok(())
}

/// Delete a branch, removing its worktree first when it has one. Refuses the
/// current branch; prompts unless `yes`.
pub fn delete_branch(repo: &Repository, branch: &str, yes: bool) -> anyhow::Result<()> {
    let items = repo.branches_and_worktrees()?;
    let Some(item) = items.iter().find(|i| i.name == branch) else {
        bail!("no such branch: {branch}");
    };
    if item.is_current {
        bail!("refusing to delete the current branch: {branch}");
    }

    if !confirm(&format!("Delete branch '{branch}'?"), yes)? {
        eprintln!("Aborted.");
        return Ok(());
    }

    if let Some(path) = &item.worktree_path {
        repo.remove_worktree(path)?;
    }
    repo.delete_branch(branch)?;
    eprintln!("Deleted {branch}");
    Ok(())
}

/// Create a worktree for a new branch via the `gwt` convention and print the
/// created path.
pub fn create_worktree(repo: &Repository, name: &str, from: Option<&str>) -> anyhow::Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("branch name is required");
    }

    let from = base_ref(repo, from)?;
    let path = repo.create_worktree(name, &from)?;
    eprintln!("Created worktree for {name}");
    println!("{}", path.display());
    Ok(())
}

/// Attach an existing plain branch as a worktree at its conventional
/// location. Prompts with the target path unless `yes`.
pub fn convert_to_worktree(repo: &Repository, branch: &str, yes: bool) -> anyhow::Result<()> {
    let items = repo.branches_and_worktrees()?;
    let Some(item) = items.iter().find(|i| i.name == branch) else {
        bail!("no such branch: {branch}");
    };
    if item.kind == BranchKind::Worktree {
        bail!("{branch} already has a worktree");
    }

    let path = repo.conventional_worktree_path(branch)?;
    let prompt = format!("Add '{branch}' as a worktree at {}?", path.display());
    if !confirm(&prompt, yes)? {
        eprintln!("Aborted.");
        return Ok(());
    }

    repo.add_worktree(&path, branch)?;
    eprintln!("Converted {branch} to worktree");
    println!("{}", path.display());
    Ok(())
}

fn base_ref(repo: &Repository, from: Option<&str>) -> anyhow::Result<String> {
    match from {
        Some(from) => Ok(from.to_string()),
        None => repo
            .current_branch()?
            .context("no --from given and HEAD is detached"),
    }
}
