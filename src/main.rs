use std::path::PathBuf;

use clap::{Parser, Subcommand};

use branchdeck::commands;
use branchdeck::commands::branches::OutputFormat;
use branchdeck::commands::init::InitArgs;
use branchdeck::config::UserConfig;
use branchdeck::git::Repository;

#[derive(Parser, Debug)]
#[command(
    name = "bd",
    version,
    about = "Browse ghq-organized repositories and manage git branches and worktrees",
    arg_required_else_help = true
)]
struct Cli {
    /// Operate on a repository at the given path (like `git -C`).
    #[arg(short = 'C', long = "repo", global = true, value_name = "PATH")]
    repo_dir: Option<PathBuf>,
    /// Path to the config TOML (defaults to ~/.config/branchdeck/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List branches and worktrees as one unified collection.
    Branches {
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Check out a branch in the primary working directory.
    Checkout {
        /// Branch name.
        branch: String,
    },
    /// Branch lifecycle.
    Branch {
        #[command(subcommand)]
        command: BranchCommand,
    },
    /// Worktree lifecycle.
    Worktree {
        #[command(subcommand)]
        command: WorktreeCommand,
    },
    /// Check out (if needed) and open a branch in a configured editor.
    Open {
        /// Branch name.
        branch: String,
        /// Editor name from the [open-with] config table.
        #[arg(long, value_name = "NAME")]
        with: Option<String>,
    },
    /// Print the resolved ghq root.
    Root,
    /// List hostname directories under the ghq root.
    Hosts,
    /// List org directories under a hostname.
    Orgs {
        /// Hostname directory, e.g. github.com.
        hostname: String,
    },
    /// List repositories under a hostname/org.
    Repos {
        /// Hostname directory, e.g. github.com.
        hostname: String,
        /// Org/owner directory.
        org: String,
    },
    /// Scaffold a new local repository under the ghq root.
    Init {
        /// Repository name (alphanumeric, dot, hyphen, underscore).
        name: String,
        /// Hostname directory to create the repository under.
        #[arg(long)]
        host: String,
        /// Org/owner directory to create the repository under.
        #[arg(long)]
        org: String,
        /// Stage everything and make an initial commit.
        #[arg(long)]
        commit: bool,
        /// Open the new repository with a configured editor afterwards.
        #[arg(long, value_name = "NAME")]
        open: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum BranchCommand {
    /// Create a branch and switch to it.
    New {
        /// Branch name.
        name: String,
        /// Base ref (defaults to the current branch).
        #[arg(long)]
        from: Option<String>,
    },
    /// Delete a branch (and its worktree, when it has one).
    Rm {
        /// Branch name.
        branch: String,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum WorktreeCommand {
    /// Create a worktree for a new branch (via the gwt convention).
    New {
        /// Branch name.
        name: String,
        /// Base ref (defaults to the current branch).
        #[arg(long)]
        from: Option<String>,
    },
    /// Convert an existing branch into a worktree checkout.
    Convert {
        /// Branch name.
        branch: String,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Cli {
        repo_dir,
        config,
        command,
    } = Cli::parse();

    let config = UserConfig::load(config.as_deref())?;
    let repo = || match &repo_dir {
        Some(dir) => Repository::at(dir),
        None => Repository::current(),
    };

    match command {
        Command::Branches { format } => commands::branches::run(&repo(), format),
        Command::Checkout { branch } => commands::lifecycle::checkout(&repo(), &branch),
        Command::Branch { command } => match command {
            BranchCommand::New { name, from } => {
                commands::lifecycle::create_branch(&repo(), &name, from.as_deref())
            }
            BranchCommand::Rm { branch, yes } => {
                commands::lifecycle::delete_branch(&repo(), &branch, yes)
            }
        },
        Command::Worktree { command } => match command {
            WorktreeCommand::New { name, from } => {
                commands::lifecycle::create_worktree(&repo(), &name, from.as_deref())
            }
            WorktreeCommand::Convert { branch, yes } => {
                commands::lifecycle::convert_to_worktree(&repo(), &branch, yes)
            }
        },
        Command::Open { branch, with } => {
            commands::open::run(&repo(), &branch, with.as_deref(), &config)
        }
        Command::Root => commands::browse::root(&config),
        Command::Hosts => commands::browse::hosts(&config),
        Command::Orgs { hostname } => commands::browse::orgs(&config, &hostname),
        Command::Repos { hostname, org } => commands::browse::repos(&config, &hostname, &org),
        Command::Init {
            name,
            host,
            org,
            commit,
            open,
        } => commands::init::run(
            &config,
            InitArgs {
                name: &name,
                host: &host,
                org: &org,
                commit,
                open: open.as_deref(),
            },
        ),
    }
}
