//! Ambient session settings threaded explicitly into every call

use std::fmt;
use std::time::Duration;

use crate::operation::ServiceSpec;

/// Access key pair plus optional session token
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

// Keep secrets out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Where and as whom calls are made
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub region: String,
    pub credentials: Option<Credentials>,
    /// Overrides the derived regional endpoint (local emulators, VPC endpoints)
    pub endpoint_url: Option<String>,
    pub timeout: Duration,
}

impl SessionConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            credentials: None,
            endpoint_url: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint for `service`, honouring the override
    pub fn endpoint_for(&self, service: &ServiceSpec) -> String {
        if let Some(url) = &self.endpoint_url {
            return url.trim_end_matches('/').to_string();
        }
        regional_endpoint(service.endpoint_prefix, &self.region)
    }
}

/// Standard regional endpoint for a service
pub fn regional_endpoint(prefix: &str, region: &str) -> String {
    if region.starts_with("cn-") {
        format!("https://{}.{}.amazonaws.com.cn", prefix, region)
    } else {
        format!("https://{}.{}.amazonaws.com", prefix, region)
    }
}
