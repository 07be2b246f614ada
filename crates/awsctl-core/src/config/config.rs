//! Configuration management for awsctl
//!
//! Configuration is stored in TOML format with support for multiple named profiles.
//! Each profile carries the ambient session settings for remote calls: region,
//! optional endpoint override, credentials and request timeout.

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::credential::CredentialStore;
use super::error::{ConfigError, Result};
use crate::session::Credentials;

/// Environment variables consulted for credentials when overrides are allowed
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration
///
/// Every field is optional; anything missing may come from the environment or the
/// command line.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Replaces the derived regional endpoint for every service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Supports the `keyring:` prefix for secure storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Profile {
    pub fn has_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Resolve credentials with keyring support and, when `use_env` is set,
    /// environment variable overrides.
    ///
    /// The environment is one source: when both `AWS_ACCESS_KEY_ID` and
    /// `AWS_SECRET_ACCESS_KEY` are set, all three values come from it and the
    /// profile is not consulted. Returns `Ok(None)` when no source supplies a key.
    pub fn resolve_credentials(&self, use_env: bool) -> Result<Option<Credentials>> {
        if use_env && let Some(credentials) = env_credentials() {
            return Ok(Some(credentials));
        }

        let store = CredentialStore::new();
        let access_key = resolve_value(&store, self.access_key_id.as_deref()).map_err(|e| {
            ConfigError::CredentialError(format!("Failed to resolve access key id: {}", e))
        })?;
        let secret_key = resolve_value(&store, self.secret_access_key.as_deref()).map_err(|e| {
            ConfigError::CredentialError(format!("Failed to resolve secret access key: {}", e))
        })?;
        let session_token = resolve_value(&store, self.session_token.as_deref()).map_err(|e| {
            ConfigError::CredentialError(format!("Failed to resolve session token: {}", e))
        })?;

        match (access_key, secret_key) {
            (Some(key), Some(secret)) => {
                let mut credentials = Credentials::new(key, secret);
                credentials.session_token = session_token;
                Ok(Some(credentials))
            }
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::CredentialError(
                "access key id is set but the secret access key is missing".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::CredentialError(
                "secret access key is set but the access key id is missing".to_string(),
            )),
        }
    }
}

fn env_value(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

/// Complete key pair from the environment, with its own session token if any
fn env_credentials() -> Option<Credentials> {
    let key = env_value(ENV_ACCESS_KEY_ID)?;
    let secret = env_value(ENV_SECRET_ACCESS_KEY)?;
    let mut credentials = Credentials::new(key, secret);
    credentials.session_token = env_value(ENV_SESSION_TOKEN);
    Some(credentials)
}

fn resolve_value(store: &CredentialStore, value: Option<&str>) -> Result<Option<String>> {
    value.map(|v| store.get_credential(v, None)).transpose()
}

impl Config {
    /// Name of the profile to use
    ///
    /// Order: explicit name, configured default, first profile alphabetically.
    /// `None` means no profile is configured at all.
    pub fn resolve_profile_name(&self, explicit_profile: Option<&str>) -> Option<String> {
        if let Some(name) = explicit_profile {
            return Some(name.to_string());
        }
        if let Some(ref default) = self.default_profile {
            return Some(default.clone());
        }
        let mut names: Vec<_> = self.profiles.keys().collect();
        names.sort();
        names.first().map(|n| n.to_string())
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name, clearing the default if it pointed there
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, this supports both the standard macOS path and Linux-style ~/.config path:
    /// 1. Check ~/.config/awsctl/config.toml (Linux-style, preferred for consistency)
    /// 2. Fall back to ~/Library/Application Support/io.awsctl.awsctl/config.toml
    ///
    /// On Linux: ~/.config/awsctl/config.toml
    /// On Windows: %APPDATA%\awsctl\awsctl\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("awsctl")
                    .join("config.toml");

                if linux_style_path.exists()
                    || linux_style_path
                        .parent()
                        .map(|p| p.exists())
                        .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("io", "awsctl", "awsctl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand environment variables in configuration content
    ///
    /// Supports ${VAR} and ${VAR:-default}. Unset variables without a default are left
    /// as-is so profiles that are not in use never fail to load.
    ///
    /// ```toml
    /// access_key_id = "${PROD_ACCESS_KEY_ID}"
    /// region = "${PROD_REGION:-us-east-1}"
    /// ```
    fn expand_env_vars(content: &str) -> String {
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok())
            .to_string()
    }
}
