//! The seam between the engine and whatever actually talks to the service
//!
//! [`ServiceClient`] is implemented by [`crate::http::HttpServiceClient`] for real
//! endpoints and by in-memory doubles in tests.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::operation::OperationSpec;
use crate::session::SessionConfig;

/// Failures reported by a [`ServiceClient`]
#[derive(Error, Debug)]
pub enum ClientError {
    /// The endpoint host name could not be resolved
    #[error("failed to resolve host {host}: {message}")]
    NameResolution { host: String, message: String },

    /// TCP/TLS connection could not be established
    #[error("failed to connect to {endpoint}: {message}")]
    Connect { endpoint: String, message: String },

    /// The request did not complete in time
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    /// The service answered with an error
    #[error("{code}: {message} (HTTP {status})")]
    Service {
        code: String,
        message: String,
        status: u16,
        request_id: Option<String>,
    },

    /// The response could not be understood
    #[error("invalid response: {0}")]
    Decode(String),

    /// Credentials are missing or unusable
    #[error("credentials unavailable: {0}")]
    Credentials(String),

    /// Any other transport failure
    #[error("HTTP error: {0}")]
    Http(String),
}

impl ClientError {
    /// DNS or connection failures, the errors that get a friendlier message
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ClientError::NameResolution { .. } | ClientError::Connect { .. }
        )
    }

    /// Error code reported by the service, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Service { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    /// HTTP status reported by the service, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Executes one remote operation
///
/// Implementations receive a fully built request body and return the raw decoded
/// response. They must not retry: the layers above rely on one call per page.
#[async_trait]
pub trait ServiceClient: Send + Sync {
    async fn invoke(
        &self,
        operation: &OperationSpec,
        session: &SessionConfig,
        request: Value,
    ) -> Result<Value, ClientError>;

    /// Endpoint a call for `operation` would be sent to, for diagnostics
    fn endpoint_for(&self, operation: &OperationSpec, session: &SessionConfig) -> String {
        session.endpoint_for(operation.service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_classification() {
        let dns = ClientError::NameResolution {
            host: "codebuild.nowhere-1.amazonaws.com".to_string(),
            message: "no such host".to_string(),
        };
        assert!(dns.is_network());

        let svc = ClientError::Service {
            code: "ResourceNotFoundException".to_string(),
            message: "missing".to_string(),
            status: 400,
            request_id: None,
        };
        assert!(!svc.is_network());
        assert_eq!(svc.code(), Some("ResourceNotFoundException"));
        assert_eq!(svc.status(), Some(400));
    }
}
