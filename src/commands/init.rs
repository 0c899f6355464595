//! `bd init` — scaffold a new local repository under the ghq root.

use std::sync::OnceLock;

use anyhow::bail;
use regex::Regex;

use super::open::launch;
use crate::config::UserConfig;
use crate::{ghq, git};

static REPO_NAME_PATTERN: OnceLock<Regex> = OnceLock::new();

fn repo_name_pattern() -> &'static Regex {
    REPO_NAME_PATTERN
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("valid repo name pattern"))
}

pub struct InitArgs<'a> {
    pub name: &'a str,
    pub host: &'a str,
    pub org: &'a str,
    pub commit: bool,
    pub open: Option<&'a str>,
}

pub fn run(config: &UserConfig, args: InitArgs<'_>) -> anyhow::Result<()> {
    let name = args.name.trim();
    if name.is_empty() {
        bail!("repository name is required");
    }
    if !repo_name_pattern().is_match(name) {
        bail!("invalid repository name {name:?}: only alphanumeric, dot, hyphen, underscore");
    }

    let root = ghq::resolve_root(config.root.as_deref())?;
    let repo_dir = root.join(args.host).join(args.org).join(name);

    eprintln!("Creating repository at {}", repo_dir.display());
    let outcome = git::init_repo(&repo_dir, name, args.commit)?;

    if outcome.commit_failed {
        eprintln!(
            "warning: initial commit failed: {}",
            outcome.commit_error.as_deref().unwrap_or("unknown error")
        );
    }
    println!("{}", outcome.repo_dir.display());

    // Editor launch failure leaves a perfectly good repository behind; warn
    // instead of failing.
    if let Some(editor) = args.open {
        let launched = config
            .open_command(editor)
            .and_then(|command| launch(&command, &outcome.repo_dir));
        if let Err(err) = launched {
            eprintln!("warning: failed to open {editor}: {err:#}");
        }
    }

    Ok(())
}
