use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

use crate::manifest::{Browser, Scope};

/// Host name the Bloss helper registers its manifest under.
pub const DEFAULT_HOST_NAME: &str = "com.harrisluo.bloss_native";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How to reach the helper and how long to wait for it.
///
/// ```rust
/// use bloss_bridge::config::BridgeConfig;
/// use std::time::Duration;
///
/// let config = BridgeConfig::from_toml_str(r#"
///     browser = "firefox"
///     sign_timeout_secs = 60
/// "#).unwrap();
/// assert_eq!(config.host_name, "com.harrisluo.bloss_native");
/// assert_eq!(config.sign_timeout(), Some(Duration::from_secs(60)));
/// assert_eq!(config.request_timeout(), None);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub host_name: String,
    pub browser: Browser,
    pub scope: Scope,
    /// Launch this executable directly instead of looking up the manifest.
    pub executable: Option<PathBuf>,
    /// Caller origin handed to the helper as its first argument.
    pub origin: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub sign_timeout_secs: Option<u64>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host_name: DEFAULT_HOST_NAME.to_string(),
            browser: Browser::default(),
            scope: Scope::default(),
            executable: None,
            origin: None,
            request_timeout_secs: None,
            sign_timeout_secs: None,
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn sign_timeout(&self) -> Option<Duration> {
        self.sign_timeout_secs.map(Duration::from_secs)
    }
}
