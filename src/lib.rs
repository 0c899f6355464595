pub mod commands;
pub mod config;
pub mod ghq;
pub mod git;
pub mod shell_exec;

// Re-export the types most callers need
pub use config::UserConfig;
pub use git::{BranchItem, BranchKind, InitOutcome, Repository};
