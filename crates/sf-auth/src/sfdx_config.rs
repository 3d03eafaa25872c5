//! Read the default org from Salesforce CLI config files.
//!
//! Lookup order for a [`TargetKey`]:
//!
//! 1. Environment (`SF_TARGET_DEV_HUB`, legacy `SFDX_DEFAULTDEVHUBUSERNAME`)
//! 2. Project config: `.sf/config.json`, then `.sfdx/sfdx-config.json`, in
//!    the nearest ancestor directory holding `sfdx-project.json`
//! 3. Global config: `~/.sf/config.json`, then `~/.sfdx/sfdx-config.json`
//!
//! The value found may be an alias; aliases resolve through
//! `~/.sfdx/alias.json`. A value with no alias entry is taken as a username.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{Error, ErrorKind, Result};

const PROJECT_FILE: &str = "sfdx-project.json";
const CONFIG_FILES: [&str; 2] = [".sf/config.json", ".sfdx/sfdx-config.json"];
const ALIAS_FILE: &str = ".sfdx/alias.json";

/// Which default org to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKey {
    /// The default Dev Hub (`target-dev-hub`).
    DevHub,
    /// The default org (`target-org`).
    Org,
}

impl TargetKey {
    /// Key used by `sf config set`.
    pub fn config_key(self) -> &'static str {
        match self {
            TargetKey::DevHub => "target-dev-hub",
            TargetKey::Org => "target-org",
        }
    }

    /// Key written by older `sfdx` versions.
    pub fn legacy_key(self) -> &'static str {
        match self {
            TargetKey::DevHub => "defaultdevhubusername",
            TargetKey::Org => "defaultusername",
        }
    }

    /// Environment variable that overrides the config files.
    pub fn env_var(self) -> &'static str {
        match self {
            TargetKey::DevHub => "SF_TARGET_DEV_HUB",
            TargetKey::Org => "SF_TARGET_ORG",
        }
    }

    /// Environment variable honored by older `sfdx` versions.
    pub fn legacy_env_var(self) -> &'static str {
        match self {
            TargetKey::DevHub => "SFDX_DEFAULTDEVHUBUSERNAME",
            TargetKey::Org => "SFDX_DEFAULTUSERNAME",
        }
    }
}

impl std::fmt::Display for TargetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.config_key())
    }
}

/// Where a config value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// An environment variable.
    Environment,
    /// A project config file.
    Local(PathBuf),
    /// A config file in the home directory.
    Global(PathBuf),
}

/// A resolved default org.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigInfo {
    /// The config key that was set.
    pub key: &'static str,
    /// The value as written, which may be an alias.
    pub value: String,
    /// The username after alias resolution.
    pub username: String,
    /// Where the value was found.
    pub location: ConfigLocation,
}

impl ConfigInfo {
    /// Returns true if the configured value was an alias.
    pub fn is_alias(&self) -> bool {
        self.value != self.username
    }
}

/// Anything that can name the default org.
pub trait DefaultTargetSource: Send + Sync {
    /// Return the configured username.
    ///
    /// Fails with [`ErrorKind::NoDefaultTarget`] when nothing is configured.
    fn default_target(&self) -> Result<String>;
}

/// Salesforce CLI config reader.
#[derive(Debug, Clone)]
pub struct SfdxConfig {
    target: TargetKey,
    home: Option<PathBuf>,
    project_dir: Option<PathBuf>,
    read_env: bool,
}

impl SfdxConfig {
    /// Reader for the current user and working directory.
    pub fn load(target: TargetKey) -> Self {
        let project_dir = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::find_project_dir(&cwd));
        Self {
            target,
            home: dirs::home_dir(),
            project_dir,
            read_env: true,
        }
    }

    /// Reader rooted at explicit directories. Environment lookup is off.
    pub fn with_dirs(
        target: TargetKey,
        home: Option<PathBuf>,
        project_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            target,
            home,
            project_dir,
            read_env: false,
        }
    }

    /// Turn environment lookup on or off.
    pub fn with_env(mut self, read_env: bool) -> Self {
        self.read_env = read_env;
        self
    }

    /// The key this reader looks up.
    pub fn target_key(&self) -> TargetKey {
        self.target
    }

    /// The project directory in use, if any.
    pub fn project_dir(&self) -> Option<&Path> {
        self.project_dir.as_deref()
    }

    /// Nearest ancestor of `start` (inclusive) that contains `sfdx-project.json`.
    pub fn find_project_dir(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(PROJECT_FILE).is_file())
            .map(Path::to_path_buf)
    }

    /// Look up the configured value and where it came from.
    ///
    /// Returns `Ok(None)` when no source sets the key.
    pub fn get_info(&self) -> Result<Option<ConfigInfo>> {
        let Some((value, location)) = self.find_raw()? else {
            return Ok(None);
        };
        let username = self.resolve_alias(&value)?;
        debug!(key = self.target.config_key(), ?location, "Found default org");
        Ok(Some(ConfigInfo {
            key: self.target.config_key(),
            value,
            username,
            location,
        }))
    }

    /// Map an alias to its username. Unknown values pass through unchanged.
    pub fn resolve_alias(&self, value: &str) -> Result<String> {
        let Some(home) = &self.home else {
            return Ok(value.to_string());
        };
        let path = home.join(ALIAS_FILE);
        let Some(json) = read_json(&path)? else {
            return Ok(value.to_string());
        };

        let resolved = json
            .get("orgs")
            .and_then(|orgs| orgs.get(value))
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty());

        Ok(match resolved {
            Some(username) => {
                trace!(alias = value, "Resolved alias");
                username.to_string()
            }
            None => value.to_string(),
        })
    }

    fn find_raw(&self) -> Result<Option<(String, ConfigLocation)>> {
        if self.read_env {
            for var in [self.target.env_var(), self.target.legacy_env_var()] {
                if let Ok(value) = std::env::var(var) {
                    if !value.trim().is_empty() {
                        return Ok(Some((value.trim().to_string(), ConfigLocation::Environment)));
                    }
                }
            }
        }

        if let Some(project) = &self.project_dir {
            if let Some((value, path)) = self.read_config_files(project)? {
                return Ok(Some((value, ConfigLocation::Local(path))));
            }
        }

        if let Some(home) = &self.home {
            if let Some((value, path)) = self.read_config_files(home)? {
                return Ok(Some((value, ConfigLocation::Global(path))));
            }
        }

        Ok(None)
    }

    fn read_config_files(&self, dir: &Path) -> Result<Option<(String, PathBuf)>> {
        for file in CONFIG_FILES {
            let path = dir.join(file);
            let Some(json) = read_json(&path)? else {
                continue;
            };
            let value = [self.target.config_key(), self.target.legacy_key()]
                .into_iter()
                .find_map(|key| json.get(key).and_then(|v| v.as_str()))
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(value) = value {
                return Ok(Some((value.to_string(), path)));
            }
        }
        Ok(None)
    }
}

impl DefaultTargetSource for SfdxConfig {
    fn default_target(&self) -> Result<String> {
        self.get_info()?.map(|info| info.username).ok_or_else(|| {
            Error::new(ErrorKind::NoDefaultTarget {
                key: self.target.config_key().to_string(),
            })
        })
    }
}

/// Read a JSON file; a missing file is `Ok(None)`.
fn read_json(path: &Path) -> Result<Option<serde_json::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&content).map(Some).map_err(|e| {
        Error::with_source(
            ErrorKind::Config(format!("{} is not valid JSON", path.display())),
            e,
        )
    })
}
