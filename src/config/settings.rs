use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::svn::resolver::is_remote_url;

/// Default svn invocation timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const ENV_USERNAME: &str = "SVN_USERNAME";
pub const ENV_PASSWORD: &str = "SVN_PASSWORD";
pub const ENV_REPO_URL: &str = "SVN_REPO_URL";
pub const ENV_TRUNK_PATH: &str = "SVN_TRUNK_PATH";
pub const ENV_LOCAL_WORKING_COPY: &str = "SVN_LOCAL_WORKING_COPY";
pub const ENV_TIMEOUT_MS: &str = "SVN_TIMEOUT_MS";
pub const ENV_CONFIG_PATH: &str = "SVN_MCP_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Connection settings, read once at startup and shared read-only afterwards
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub username: Option<String>,
    pub password: Option<String>,
    pub repo_url: Option<String>,
    /// Path under `repo_url`, or a full URL of its own
    pub trunk_path: Option<String>,
    pub local_working_copy: Option<PathBuf>,
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            username: None,
            password: None,
            repo_url: None,
            trunk_path: None,
            local_working_copy: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("repo_url", &self.repo_url)
            .field("trunk_path", &self.trunk_path)
            .field("local_working_copy", &self.local_working_copy)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Config {
    /// Get the default config file path: ~/.config/svn-mcp/config.toml
    pub fn default_config_path() -> Option<PathBuf> {
        let home = std::env::var("HOME").ok()?;
        Some(
            PathBuf::from(home)
                .join(".config")
                .join("svn-mcp")
                .join("config.toml"),
        )
    }

    /// Load configuration: optional TOML file, then the process environment on top
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(Self::default_config_path);

        let base = match path {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "Reading config file");
                let contents = fs::read_to_string(&path)?;
                toml::from_str(&contents)?
            }
            _ => Config::default(),
        };

        let config = base.with_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Build configuration from an arbitrary key lookup, starting from defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config::default().with_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Apply values from `lookup` over this config; empty values count as unset
    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_USERNAME) {
            self.username = Some(v);
        }
        if let Some(v) = get(ENV_PASSWORD) {
            self.password = Some(v);
        }
        if let Some(v) = get(ENV_REPO_URL) {
            self.repo_url = Some(v);
        }
        if let Some(v) = get(ENV_TRUNK_PATH) {
            self.trunk_path = Some(v);
        }
        if let Some(v) = get(ENV_LOCAL_WORKING_COPY) {
            self.local_working_copy = Some(PathBuf::from(v));
        }
        if let Some(v) = get(ENV_TIMEOUT_MS) {
            match v.trim().parse::<u64>() {
                Ok(ms) => self.timeout_ms = ms,
                Err(_) => tracing::warn!(value = %v, "Ignoring non-numeric {}", ENV_TIMEOUT_MS),
            }
        }

        self
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }

        if let Some(ref url) = self.repo_url {
            if !is_remote_url(url) {
                tracing::warn!(
                    url = %url,
                    "Repository URL has no svn://, svn+ssh://, http://, https:// or file:// scheme; remote lookups may fail"
                );
            }
        }

        Ok(())
    }

    /// Both username and password are configured
    pub fn has_credentials(&self) -> bool {
        self.credentials().is_some()
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }

    /// Trunk path configured as a complete URL rather than a sub-path
    pub fn trunk_url(&self) -> Option<&str> {
        self.trunk_path.as_deref().filter(|t| is_remote_url(t))
    }
}
