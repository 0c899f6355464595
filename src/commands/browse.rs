//! Listing commands over the ghq root: `root`, `hosts`, `orgs`, `repos`.

use crate::config::UserConfig;
use crate::ghq;

pub fn root(config: &UserConfig) -> anyhow::Result<()> {
    let root = ghq::resolve_root(config.root.as_deref())?;
    println!("{}", root.display());
    Ok(())
}

pub fn hosts(config: &UserConfig) -> anyhow::Result<()> {
    let root = ghq::resolve_root(config.root.as_deref())?;
    for hostname in ghq::list_hostnames(&root, &config.preferred_hostnames)? {
        println!("{hostname}");
    }
    Ok(())
}

pub fn orgs(config: &UserConfig, hostname: &str) -> anyhow::Result<()> {
    let root = ghq::resolve_root(config.root.as_deref())?;
    for org in ghq::list_orgs(&root, hostname, config.preferred_orgs_for(hostname))? {
        println!("{org}");
    }
    Ok(())
}

pub fn repos(config: &UserConfig, hostname: &str, org: &str) -> anyhow::Result<()> {
    let root = ghq::resolve_root(config.root.as_deref())?;
    for repo in ghq::list_repos(&root, hostname, org)? {
        println!("{}\t{}", repo.name, repo.full_path.display());
    }
    Ok(())
}
