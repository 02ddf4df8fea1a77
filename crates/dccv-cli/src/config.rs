//! # CLI Configuration
//!
//! Optional YAML file given with `--config`, overridden by environment
//! variables, falling back to defaults.
//!
//! ```yaml
//! store_root: /data/dccv/tables
//! log_format: json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use dccv_table::{StoreConfig, DEFAULT_STORE_ROOT, STORE_ROOT_ENV};

/// How log lines are written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Root directory of the filesystem table store.
    #[serde(default)]
    pub store_root: Option<PathBuf>,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Load the file at `path` (if any), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var_os(var).map(PathBuf::from));
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<PathBuf>) {
        if let Some(root) = lookup(STORE_ROOT_ENV).filter(|p| !p.as_os_str().is_empty()) {
            self.store_root = Some(root);
        }
    }

    /// Table store settings derived from this configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(
            self.store_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_ROOT)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = CliConfig::default();
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.store_config().root, PathBuf::from(DEFAULT_STORE_ROOT));
    }

    #[test]
    fn reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dccv.yaml");
        std::fs::write(&path, "store_root: /srv/tables\nlog_format: json\n").unwrap();
        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(config.store_root, Some(PathBuf::from("/srv/tables")));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dccv.yaml");
        std::fs::write(&path, "store_rot: /srv/tables\n").unwrap();
        assert!(CliConfig::from_file(&path).is_err());
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = CliConfig {
            store_root: Some(PathBuf::from("/from/file")),
            log_format: LogFormat::Text,
        };
        config.apply_env(|var| (var == STORE_ROOT_ENV).then(|| PathBuf::from("/from/env")));
        assert_eq!(config.store_config().root, PathBuf::from("/from/env"));
    }

    #[test]
    fn empty_environment_value_is_ignored() {
        let mut config = CliConfig::default();
        config.apply_env(|_| Some(PathBuf::new()));
        assert_eq!(config.store_root, None);
    }
}
