//! User configuration.
//!
//! Loaded from `~/.config/branchdeck/config.toml` (or `$BRANCHDECK_CONFIG`,
//! or an explicit `--config` path). Everything is optional; an absent file
//! yields defaults. Preference lists are plain values handed to the sorter
//! and resolver at call time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::Deserialize;

pub const CONFIG_ENV_VAR: &str = "BRANCHDECK_CONFIG";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UserConfig {
    /// Override for the ghq root (tilde-expanded by the resolver).
    pub root: Option<PathBuf>,
    /// Hostnames to show first, in this order.
    pub preferred_hostnames: Vec<String>,
    /// Per-hostname org ordering.
    pub preferred_orgs: HashMap<String, Vec<String>>,
    /// Named editor command lines for `open --with`, e.g.
    /// `code = "code --new-window"`.
    pub open_with: HashMap<String, String>,
    /// Editor name used when `--with` is omitted.
    pub default_open: Option<String>,
}

impl UserConfig {
    /// Load configuration.
    ///
    /// An explicitly requested file (flag or env var) must exist and parse;
    /// a missing file at the default location yields defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let explicit = match path {
            Some(p) => Some(p.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from),
        };

        let path = match explicit {
            Some(path) => path,
            None => {
                let Some(path) = default_config_path() else {
                    return Ok(Self::default());
                };
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("failed to parse TOML: {}", path.display()))?;
        Ok(config)
    }

    /// Org preference list for a hostname (empty when none is configured).
    pub fn preferred_orgs_for(&self, hostname: &str) -> &[String] {
        self.preferred_orgs
            .get(hostname)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve an editor's command line from `[open-with]`, split into words
    /// per shell rules.
    pub fn open_command(&self, name: &str) -> anyhow::Result<Vec<String>> {
        let Some(line) = self.open_with.get(name) else {
            bail!("no [open-with] entry named {name:?} in config");
        };
        let words = shlex::split(line)
            .with_context(|| format!("unparsable [open-with] command for {name:?}: {line}"))?;
        if words.is_empty() {
            bail!("empty [open-with] command for {name:?}");
        }
        Ok(words)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("branchdeck").join("config.toml"))
}
