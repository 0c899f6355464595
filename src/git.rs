//! Git subprocess layer: branch/worktree enumeration, lifecycle operations,
//! and new-repository scaffolding.
//!
//! Everything here shells out to `git` (and, for worktree conventions, `gwt`)
//! through [`crate::shell_exec`] and parses line-oriented stdout. The parsers
//! are pure functions so they can be tested against captured output without
//! invoking the tools.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use indexmap::IndexMap;
use serde::Serialize;

use crate::shell_exec;

/// Branch name a fresh repository is renamed to after `git init`.
pub const DEFAULT_BRANCH: &str = "main";

const GITIGNORE_BOILERPLATE: &str = ".DS_Store\n.idea/\n.vscode/\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchKind {
    Branch,
    Worktree,
}

/// A unified branch-or-worktree entry.
///
/// One entry per distinct branch name; a branch with a worktree checkout is
/// classified [`BranchKind::Worktree`] and carries the checkout path.
/// `is_current` reflects the primary working directory's HEAD only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BranchKind,
    pub is_current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worktree_path: Option<PathBuf>,
}

/// One record from `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq)]
pub struct Worktree {
    pub path: PathBuf,
    pub head: String,
    pub branch: Option<String>,
    pub bare: bool,
    pub detached: bool,
}

/// Repository context for git operations.
///
/// Encapsulates the repository path; every git subprocess runs as
/// `git -C <path> ...`.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
}

impl Repository {
    /// Create a repository context at the specified path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a repository context for the current directory.
    pub fn current() -> Self {
        Self::at(".")
    }

    /// Get the path this repository context operates on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a git command in this repository's context, returning trimmed
    /// stdout. Non-zero exit and timeout surface as errors.
    pub fn run_git(&self, args: &[&str]) -> anyhow::Result<String> {
        let mut parts = vec![
            "git".to_string(),
            "-C".to_string(),
            quote(&self.path.to_string_lossy()),
        ];
        parts.extend(args.iter().map(|a| quote(a)));
        shell_exec::run(&parts.join(" "), None)
    }

    /// Produce the unified, classified branch/worktree collection.
    ///
    /// Both listing commands must succeed; either failure fails the whole
    /// aggregation (no partial result).
    pub fn branches_and_worktrees(&self) -> anyhow::Result<Vec<BranchItem>> {
        let branches = parse_branch_list(&self.run_git(&["branch"])?);
        let worktrees = self.list_worktrees()?;
        Ok(merge_branches_and_worktrees(
            branches,
            linked_worktrees(&worktrees),
        ))
    }

    /// List all worktrees for this repository.
    pub fn list_worktrees(&self) -> anyhow::Result<Vec<Worktree>> {
        parse_worktree_list(&self.run_git(&["worktree", "list", "--porcelain"])?)
    }

    /// Find the linked worktree path for a given branch, if one exists.
    pub fn worktree_for_branch(&self, branch: &str) -> anyhow::Result<Option<PathBuf>> {
        let worktrees = self.list_worktrees()?;
        Ok(linked_worktrees(&worktrees)
            .iter()
            .find(|wt| wt.branch.as_deref() == Some(branch))
            .map(|wt| wt.path.clone()))
    }

    /// Get the current branch name, or None if in detached HEAD state.
    pub fn current_branch(&self) -> anyhow::Result<Option<String>> {
        let stdout = self.run_git(&["branch", "--show-current"])?;
        if stdout.is_empty() {
            Ok(None)
        } else {
            Ok(Some(stdout))
        }
    }

    /// Check out a branch in the primary working directory.
    pub fn checkout(&self, branch: &str) -> anyhow::Result<()> {
        self.run_git(&["checkout", branch])
            .with_context(|| format!("failed to check out {branch}"))?;
        Ok(())
    }

    /// Create a branch off `from` and switch to it.
    pub fn create_branch(&self, name: &str, from: &str) -> anyhow::Result<()> {
        self.run_git(&["checkout", "-b", name, from])
            .with_context(|| format!("failed to create branch {name} from {from}"))?;
        Ok(())
    }

    /// Delete a local branch. Callers remove an attached worktree first.
    pub fn delete_branch(&self, name: &str) -> anyhow::Result<()> {
        self.run_git(&["branch", "-d", name])
            .with_context(|| format!("failed to delete branch {name}"))?;
        Ok(())
    }

    /// Attach an existing branch as a worktree checkout at `path`.
    pub fn add_worktree(&self, path: &Path, branch: &str) -> anyhow::Result<()> {
        self.run_git(&["worktree", "add", &path.to_string_lossy(), branch])
            .with_context(|| format!("failed to add worktree for {branch}"))?;
        Ok(())
    }

    /// Remove a worktree checkout.
    pub fn remove_worktree(&self, path: &Path) -> anyhow::Result<()> {
        self.run_git(&["worktree", "remove", &path.to_string_lossy()])
            .with_context(|| format!("failed to remove worktree {}", path.display()))?;
        Ok(())
    }

    /// Query the conventional worktree location for a branch from the `gwt`
    /// tool. The convention is owned by that tool, not recomputed here.
    pub fn conventional_worktree_path(&self, branch: &str) -> anyhow::Result<PathBuf> {
        let stdout = shell_exec::run(&format!("gwt path {}", quote(branch)), Some(&self.path))
            .with_context(|| format!("failed to query worktree path for {branch}"))?;
        if stdout.is_empty() {
            bail!("gwt printed no worktree path for {branch}");
        }
        Ok(PathBuf::from(stdout))
    }

    /// Create a worktree for a new branch via `gwt create`. The created path
    /// is the last line of the tool's stdout.
    pub fn create_worktree(&self, name: &str, from: &str) -> anyhow::Result<PathBuf> {
        let stdout = shell_exec::run(
            &format!("gwt create {} --from {}", quote(name), quote(from)),
            Some(&self.path),
        )
        .with_context(|| format!("failed to create worktree for {name}"))?;
        let last = stdout.lines().last().unwrap_or("").trim();
        if last.is_empty() {
            bail!("gwt create printed no worktree path for {name}");
        }
        Ok(PathBuf::from(last))
    }
}

fn quote(s: &str) -> String {
    shell_escape::escape(Cow::from(s)).into_owned()
}

/// Parse `git branch` output into ordered `(name, is_current)` pairs.
///
/// Parsing contract: the current branch is marked with `*` in column 0;
/// branches checked out in linked worktrees are marked with `+` (treated as
/// non-current); surrounding whitespace is trimmed; blank lines and the
/// detached-HEAD pseudo entry `(HEAD detached at ...)` are skipped.
fn parse_branch_list(output: &str) -> Vec<(String, bool)> {
    output
        .lines()
        .filter_map(|line| {
            let is_current = line.starts_with('*');
            let name = line.trim_start_matches(['*', '+']).trim();
            if name.is_empty() || name.starts_with('(') {
                return None;
            }
            Some((name.to_string(), is_current))
        })
        .collect()
}

/// Parse `git worktree list --porcelain` output.
///
/// Records are blank-line separated; each starts with a `worktree <path>`
/// line followed by attribute lines. Unknown attributes are ignored for
/// forward compatibility.
fn parse_worktree_list(output: &str) -> anyhow::Result<Vec<Worktree>> {
    let mut worktrees = Vec::new();
    let mut current: Option<Worktree> = None;

    for line in output.lines() {
        if line.is_empty() {
            if let Some(wt) = current.take() {
                worktrees.push(wt);
            }
            continue;
        }

        let (key, value) = match line.split_once(' ') {
            Some((k, v)) => (k, Some(v)),
            None => (line, None),
        };

        match key {
            "worktree" => {
                if let Some(wt) = current.take() {
                    worktrees.push(wt);
                }
                let path = value.context("worktree line missing path")?;
                current = Some(Worktree {
                    path: PathBuf::from(path),
                    head: String::new(),
                    branch: None,
                    bare: false,
                    detached: false,
                });
            }
            "HEAD" => {
                if let Some(ref mut wt) = current {
                    wt.head = value.context("HEAD line missing SHA")?.to_string();
                }
            }
            "branch" => {
                if let Some(ref mut wt) = current {
                    let branch_ref = value.context("branch line missing ref")?;
                    let branch = branch_ref
                        .strip_prefix("refs/heads/")
                        .unwrap_or(branch_ref)
                        .to_string();
                    wt.branch = Some(branch);
                }
            }
            "bare" => {
                if let Some(ref mut wt) = current {
                    wt.bare = true;
                }
            }
            "detached" => {
                if let Some(ref mut wt) = current {
                    wt.detached = true;
                }
            }
            _ => {}
        }
    }

    // Output may not end with a blank line
    if let Some(wt) = current {
        worktrees.push(wt);
    }

    Ok(worktrees)
}

/// The linked worktrees of a porcelain listing. `git worktree list` always
/// reports the primary working tree as its first record; the branch checked
/// out there is a plain branch, not a worktree checkout.
fn linked_worktrees(worktrees: &[Worktree]) -> &[Worktree] {
    worktrees.get(1..).unwrap_or(&[])
}

/// Overlay worktree attribution onto the branch listing. `worktrees` must be
/// the linked records only, with the primary working tree already dropped.
///
/// Branch-command order is preserved; attribution mutates entries in place.
/// Worktree records that are bare, detached, or missing a branch ref have no
/// branch name to key on and are skipped. A worktree referencing a branch
/// absent from the branch listing appends a synthetic non-current entry.
fn merge_branches_and_worktrees(
    branches: Vec<(String, bool)>,
    worktrees: &[Worktree],
) -> Vec<BranchItem> {
    let mut items: IndexMap<String, BranchItem> = branches
        .into_iter()
        .map(|(name, is_current)| {
            let item = BranchItem {
                name: name.clone(),
                kind: BranchKind::Branch,
                is_current,
                worktree_path: None,
            };
            (name, item)
        })
        .collect();

    for wt in worktrees {
        if wt.bare || wt.detached {
            continue;
        }
        let Some(branch) = &wt.branch else {
            continue;
        };
        let entry = items.entry(branch.clone()).or_insert_with(|| BranchItem {
            name: branch.clone(),
            kind: BranchKind::Branch,
            is_current: false,
            worktree_path: None,
        });
        entry.kind = BranchKind::Worktree;
        entry.worktree_path = Some(wt.path.clone());
    }

    items.into_values().collect()
}

/// Result of scaffolding a new repository.
///
/// A failed initial commit is represented here as data rather than an error:
/// the repository on disk is still usable, so both outcomes are successes
/// from the caller's point of view.
#[derive(Debug, Clone, PartialEq)]
pub struct InitOutcome {
    pub repo_dir: PathBuf,
    pub commit_failed: bool,
    pub commit_error: Option<String>,
}

/// Create a new git repository with `README.md` and `.gitignore`.
///
/// Fails if `repo_dir` already exists, or if directory creation or
/// `git init` fails. If `initial_commit` is set but the commit fails (e.g.
/// no git identity configured), the outcome reports `commit_failed` instead
/// of failing — nothing is rolled back.
pub fn init_repo(
    repo_dir: &Path,
    repo_name: &str,
    initial_commit: bool,
) -> anyhow::Result<InitOutcome> {
    if repo_dir.exists() {
        bail!("directory already exists: {}", repo_dir.display());
    }

    std::fs::create_dir_all(repo_dir)
        .with_context(|| format!("failed to create {}", repo_dir.display()))?;

    let repo = Repository::at(repo_dir);
    repo.run_git(&["init"]).context("git init failed")?;
    repo.run_git(&["branch", "-M", DEFAULT_BRANCH])
        .with_context(|| format!("failed to rename default branch to {DEFAULT_BRANCH}"))?;

    std::fs::write(repo_dir.join("README.md"), format!("# {repo_name}\n"))
        .context("failed to write README.md")?;
    std::fs::write(repo_dir.join(".gitignore"), GITIGNORE_BOILERPLATE)
        .context("failed to write .gitignore")?;

    if initial_commit {
        let committed = repo
            .run_git(&["add", "-A"])
            .and_then(|_| repo.run_git(&["commit", "-m", "Initial commit"]));
        if let Err(err) = committed {
            return Ok(InitOutcome {
                repo_dir: repo_dir.to_path_buf(),
                commit_failed: true,
                commit_error: Some(format!("{err:#}")),
            });
        }
    }

    Ok(InitOutcome {
        repo_dir: repo_dir.to_path_buf(),
        commit_failed: false,
        commit_error: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn branch(name: &str, is_current: bool) -> (String, bool) {
        (name.to_string(), is_current)
    }

    fn worktree(path: &str, branch: Option<&str>) -> Worktree {
        Worktree {
            path: PathBuf::from(path),
            head: "0123456789abcdef".to_string(),
            branch: branch.map(str::to_string),
            bare: false,
            detached: false,
        }
    }

    #[test]
    fn parse_branch_list_marks_current() {
        let output = "  feature/login\n* main\n  release\n";
        assert_eq!(
            parse_branch_list(output),
            vec![
                branch("feature/login", false),
                branch("main", true),
                branch("release", false),
            ]
        );
    }

    #[test]
    fn parse_branch_list_skips_blank_lines() {
        let output = "* main\n\n  dev\n";
        assert_eq!(
            parse_branch_list(output),
            vec![branch("main", true), branch("dev", false)]
        );
    }

    #[test]
    fn parse_branch_list_detached_head_has_no_current() {
        let output = "* (HEAD detached at 1a2b3c4)\n  main\n  dev\n";
        let parsed = parse_branch_list(output);
        assert_eq!(parsed, vec![branch("main", false), branch("dev", false)]);
        assert!(parsed.iter().all(|(_, is_current)| !is_current));
    }

    #[rstest]
    #[case("+ linked\n* main\n", "linked")]
    #[case("+ wt/feature\n* main\n", "wt/feature")]
    fn parse_branch_list_plus_marker_is_not_current(#[case] output: &str, #[case] name: &str) {
        let parsed = parse_branch_list(output);
        assert_eq!(parsed[0], branch(name, false));
        assert_eq!(parsed[1], branch("main", true));
    }

    #[test]
    fn parse_worktree_list_full_record() {
        let output = "worktree /repos/app\n\
                      HEAD 1111111111111111111111111111111111111111\n\
                      branch refs/heads/main\n\
                      \n\
                      worktree /repos/app-feature\n\
                      HEAD 2222222222222222222222222222222222222222\n\
                      branch refs/heads/feature\n";
        let worktrees = parse_worktree_list(output).unwrap();
        assert_eq!(worktrees.len(), 2);
        assert_eq!(worktrees[0].path, PathBuf::from("/repos/app"));
        assert_eq!(worktrees[0].branch.as_deref(), Some("main"));
        assert_eq!(worktrees[1].branch.as_deref(), Some("feature"));
    }

    #[test]
    fn parse_worktree_list_bare_and_detached() {
        let output = "worktree /repos/app.git\n\
                      bare\n\
                      \n\
                      worktree /repos/app-detached\n\
                      HEAD 3333333333333333333333333333333333333333\n\
                      detached\n";
        let worktrees = parse_worktree_list(output).unwrap();
        assert!(worktrees[0].bare);
        assert!(worktrees[0].branch.is_none());
        assert!(worktrees[1].detached);
        assert!(worktrees[1].branch.is_none());
    }

    #[test]
    fn parse_worktree_list_ignores_unknown_keys() {
        let output = "worktree /repos/app\n\
                      HEAD 4444444444444444444444444444444444444444\n\
                      branch refs/heads/main\n\
                      locked reason\n\
                      somefuturekey value\n";
        let worktrees = parse_worktree_list(output).unwrap();
        assert_eq!(worktrees.len(), 1);
        assert_eq!(worktrees[0].branch.as_deref(), Some("main"));
    }

    #[test]
    fn merge_attributes_worktrees_in_place() {
        let branches = vec![
            branch("feature", false),
            branch("main", true),
            branch("release", false),
        ];
        let worktrees = [worktree("/wt/feature", Some("feature"))];

        let items = merge_branches_and_worktrees(branches, &worktrees);

        assert_eq!(items.len(), 3);
        // Order preserved, attribution applied without reordering
        assert_eq!(items[0].name, "feature");
        assert_eq!(items[0].kind, BranchKind::Worktree);
        assert_eq!(items[0].worktree_path, Some(PathBuf::from("/wt/feature")));
        assert_eq!(items[1].name, "main");
        assert_eq!(items[1].kind, BranchKind::Branch);
        assert!(items[1].is_current);
        assert_eq!(items[2].kind, BranchKind::Branch);
        assert!(items[2].worktree_path.is_none());
    }

    #[test]
    fn primary_working_tree_record_is_not_a_worktree_checkout() {
        // First porcelain record is the repository itself
        let branches = vec![branch("main", true), branch("feature", false)];
        let worktrees = [
            worktree("/repos/app", Some("main")),
            worktree("/repos/app-feature", Some("feature")),
        ];

        let items = merge_branches_and_worktrees(branches, linked_worktrees(&worktrees));

        let main = items.iter().find(|i| i.name == "main").unwrap();
        assert_eq!(main.kind, BranchKind::Branch);
        assert!(main.is_current);
        assert!(main.worktree_path.is_none());

        let feature = items.iter().find(|i| i.name == "feature").unwrap();
        assert_eq!(feature.kind, BranchKind::Worktree);
        assert_eq!(
            feature.worktree_path,
            Some(PathBuf::from("/repos/app-feature"))
        );
    }

    #[test]
    fn merge_produces_one_entry_per_branch() {
        let branches = vec![branch("main", true), branch("feature", false)];
        let worktrees = [
            worktree("/wt/main", Some("main")),
            worktree("/wt/feature", Some("feature")),
        ];

        let items = merge_branches_and_worktrees(branches, &worktrees);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.kind == BranchKind::Worktree));
    }

    #[test]
    fn merge_appends_synthetic_entry_for_orphan_worktree() {
        let branches = vec![branch("main", true)];
        let worktrees = [worktree("/wt/ghost", Some("ghost"))];

        let items = merge_branches_and_worktrees(branches, &worktrees);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].name, "ghost");
        assert_eq!(items[1].kind, BranchKind::Worktree);
        assert!(!items[1].is_current);
    }

    #[test]
    fn merge_skips_bare_and_detached_worktrees() {
        let branches = vec![branch("main", true)];
        let mut bare = worktree("/repos/app.git", None);
        bare.bare = true;
        let mut detached = worktree("/wt/detached", None);
        detached.detached = true;

        let items = merge_branches_and_worktrees(branches, &[bare, detached]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, BranchKind::Branch);
    }

    #[test]
    fn merge_keeps_at_most_one_current() {
        let branches = vec![branch("main", true), branch("dev", false)];
        let worktrees = [worktree("/wt/dev", Some("dev"))];

        let items = merge_branches_and_worktrees(branches, &worktrees);
        let current: Vec<_> = items.iter().filter(|i| i.is_current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].name, "main");
    }

    #[test]
    fn branch_item_serializes_with_type_tag() {
        let item = BranchItem {
            name: "feature".to_string(),
            kind: BranchKind::Worktree,
            is_current: false,
            worktree_path: Some(PathBuf::from("/wt/feature")),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "worktree");
        assert_eq!(json["worktree_path"], "/wt/feature");

        let plain = BranchItem {
            name: "main".to_string(),
            kind: BranchKind::Branch,
            is_current: true,
            worktree_path: None,
        };
        let json = serde_json::to_value(&plain).unwrap();
        assert_eq!(json["type"], "branch");
        assert!(json.get("worktree_path").is_none());
    }
}
