//! `right_st` configuration file.
//!
//! # Layout
//!
//! ```yaml
//! login:
//!   default_environment: production
//!   environments:
//!     production:
//!       account: 12345
//!       host: us-3.rightscale.com
//!       refresh_token: "..."
//! ```
//!
//! # API pattern
//!
//! - `load_at(path)`: explicit path; used by tests and `--config`
//! - `load()`: `~/.right_st.yml`, delegates to `load_at`

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// File name of the default config, relative to the home directory.
pub const DEFAULT_CONFIG_FILE: &str = ".right_st.yml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub login: Login,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Login {
    #[serde(default)]
    pub default_environment: Option<String>,
    #[serde(default)]
    pub environments: BTreeMap<String, Environment>,
}

/// Credentials for one remote platform endpoint.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Environment {
    pub account: u64,
    pub host: String,
    pub refresh_token: String,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("account", &self.account)
            .field("host", &self.host)
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Pick the environment to talk to.
    ///
    /// Precedence: `selected` → `login.default_environment` → the only
    /// configured environment.
    pub fn environment(&self, selected: Option<&str>) -> Result<(&str, &Environment), ConfigError> {
        let environments = &self.login.environments;
        let name = match selected.or(self.login.default_environment.as_deref()) {
            Some(name) => name,
            None if environments.len() == 1 => environments
                .keys()
                .next()
                .map(String::as_str)
                .ok_or(ConfigError::EnvironmentNotSelected)?,
            None => return Err(ConfigError::EnvironmentNotSelected),
        };

        let (name, env) =
            environments
                .get_key_value(name)
                .ok_or_else(|| ConfigError::UnknownEnvironment {
                    name: name.to_string(),
                    known: known_names(environments),
                })?;
        env.check(name)?;
        Ok((name.as_str(), env))
    }
}

impl Environment {
    fn check(&self, name: &str) -> Result<(), ConfigError> {
        let reason = if self.host.trim().is_empty() {
            "host is empty"
        } else if self.host.contains("://") {
            "host must be a bare hostname without scheme"
        } else if self.refresh_token.trim().is_empty() {
            "refresh_token is empty"
        } else {
            return Ok(());
        };
        Err(ConfigError::Invalid {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    }
}

/// `<home>/.right_st.yml`: pure, no I/O.
pub fn default_path_at(home: &Path) -> PathBuf {
    home.join(DEFAULT_CONFIG_FILE)
}

/// `~/.right_st.yml`
pub fn default_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    Ok(default_path_at(&home))
}

/// Load the config at `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with
/// path) if malformed.
pub fn load_at(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&default_path()?)
}

fn known_names(environments: &BTreeMap<String, Environment>) -> String {
    if environments.is_empty() {
        return "none".to_string();
    }
    environments
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
