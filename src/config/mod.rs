use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    errors::{CoreError, Result},
    periodicity::DateWindow,
    utils::paths::{ensure_dir, write_atomic, PathResolver},
};

fn default_approver_levels() -> BTreeMap<String, u8> {
    [
        ("contributor", 1),
        ("partner", 1),
        ("user", 1),
        ("manager", 3),
        ("admin", 3),
    ]
    .into_iter()
    .map(|(role, level)| (role.to_string(), level))
    .collect()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".into()
}

fn default_currency() -> String {
    "EUR".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Used for tasks without explicit start/end dates.
    #[serde(default)]
    pub program_window: DateWindow,
    /// Role name (case-insensitive) to approver level.
    #[serde(default = "default_approver_levels")]
    pub approver_levels: BTreeMap<String, u8>,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            program_window: DateWindow::default(),
            approver_levels: default_approver_levels(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.program_window.is_inverted() {
            return Err(CoreError::Config(format!(
                "program window ends ({}) before it starts ({})",
                self.program_window.end, self.program_window.start
            )));
        }
        if self.approver_levels.is_empty() {
            return Err(CoreError::Config(
                "at least one approver role must be configured".into(),
            ));
        }
        if let Some((role, _)) = self.approver_levels.iter().find(|(_, level)| **level == 0) {
            return Err(CoreError::Config(format!(
                "approver role `{role}` has level 0; levels start at 1"
            )));
        }
        Ok(())
    }
}

/// Loads and stores `config.json` under the application home directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::from_base(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    /// Returns the stored configuration, or defaults when none was saved yet.
    pub fn load(&self) -> Result<Config> {
        let config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| {
                CoreError::Config(format!("{}: {err}", self.path.display()))
            })?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
