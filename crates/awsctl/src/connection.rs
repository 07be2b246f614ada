//! Session resolution: which region, endpoint and credentials a call uses

use std::path::PathBuf;

use awsctl_core::{Config, Profile, SessionConfig};
use tracing::{debug, info, trace};

use crate::error::{AwsCtlError, Result as CliResult};

const ENV_REGION: &str = "AWS_REGION";
const ENV_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
const ENV_ENDPOINT_URL: &str = "AWS_ENDPOINT_URL";

/// Values given on the command line; they win over everything else
#[derive(Debug, Clone, Default)]
pub struct SessionOverrides {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

/// Holds the loaded configuration and turns it into [`SessionConfig`]s
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    /// Create a connection manager, remembering an explicit config path if one was given
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self) -> CliResult<()> {
        match self.config_path {
            Some(ref path) => self.config.save_to_path(path)?,
            None => self.config.save()?,
        }
        Ok(())
    }

    /// Path of the active configuration file
    pub fn active_config_path(&self) -> CliResult<PathBuf> {
        match self.config_path {
            Some(ref path) => Ok(path.clone()),
            None => Ok(Config::config_path()?),
        }
    }

    /// When --config-file is specified explicitly, environment variables are ignored so
    /// an isolated config behaves the same on every machine.
    pub fn use_env_vars(&self) -> bool {
        self.config_path.is_none()
    }

    /// Build the session for one invocation
    ///
    /// Region: `--region`, `AWS_REGION`, `AWS_DEFAULT_REGION`, profile.
    /// Endpoint: `--endpoint-url`, `AWS_ENDPOINT_URL`, profile.
    /// Credentials: environment, then profile (with keyring references resolved).
    pub fn session(&self, overrides: &SessionOverrides) -> CliResult<SessionConfig> {
        let use_env = self.use_env_vars();
        debug!(
            "Resolving session (config path: {:?}, use_env_vars: {})",
            self.config_path, use_env
        );
        if !use_env {
            info!("--config-file specified explicitly, ignoring environment variables");
        }

        let default_profile = Profile::default();
        let profile = match self
            .config
            .resolve_profile_name(overrides.profile.as_deref())
        {
            Some(name) => {
                info!("Using profile: {}", name);
                self.config.profile(&name)?
            }
            None => {
                debug!("No profile configured, relying on flags and environment");
                &default_profile
            }
        };

        let env = |var: &str| {
            if use_env {
                std::env::var(var).ok().filter(|v| !v.is_empty())
            } else {
                None
            }
        };

        let region = overrides
            .region
            .clone()
            .or_else(|| env(ENV_REGION))
            .or_else(|| env(ENV_DEFAULT_REGION))
            .or_else(|| profile.region.clone())
            .ok_or(AwsCtlError::MissingRegion)?;
        trace!("Region: {}", region);

        let mut session = SessionConfig::new(region);

        if let Some(url) = overrides
            .endpoint_url
            .clone()
            .or_else(|| env(ENV_ENDPOINT_URL))
            .or_else(|| profile.endpoint_url.clone())
        {
            debug!("Endpoint override: {}", url);
            session = session.with_endpoint_url(url);
        }

        if let Some(credentials) = profile.resolve_credentials(use_env)? {
            debug!("Using access key {}", credentials.access_key_id);
            session = session.with_credentials(credentials);
        }

        if let Some(timeout) = profile.timeout() {
            session = session.with_timeout(timeout);
        }

        Ok(session)
    }
}
