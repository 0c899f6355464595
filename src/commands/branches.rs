//! `bd branches` — the unified branch/worktree listing.

use clap::ValueEnum;

use crate::git::Repository;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn run(repo: &Repository, format: OutputFormat) -> anyhow::Result<()> {
    let items = repo.branches_and_worktrees()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Text => {
            for item in &items {
                let mut tags = Vec::new();
                if item.is_current {
                    tags.push("current".to_string());
                }
                if let Some(path) = &item.worktree_path {
                    tags.push(format!("worktree {}", path.display()));
                }
                if tags.is_empty() {
                    println!("{}", item.name);
                } else {
                    println!("{}  ({})", item.name, tags.join(", "));
                }
            }
        }
    }

    Ok(())
}
