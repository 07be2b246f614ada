//! Unified error handling for awsctl-core
//!
//! Client failures, local validation and configuration problems share one type with
//! classification helpers so callers never need to match on transport details.
//!
//! # Example
//!
//! ```rust
//! use awsctl_core::{ClientError, CoreError};
//!
//! let err: CoreError = ClientError::Service {
//!     code: "ResourceNotFoundException".to_string(),
//!     message: "Project not found".to_string(),
//!     status: 400,
//!     request_id: None,
//! }
//! .into();
//! assert!(err.is_not_found());
//! ```

use thiserror::Error;

use crate::client::ClientError;
use crate::config::ConfigError;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// The service endpoint could not be reached at the network level
    #[error(
        "Name resolution or connection failure attempting to reach service endpoint {endpoint} in region '{region}'. \
         Check network connectivity and the region and endpoint settings."
    )]
    EndpointUnreachable {
        endpoint: String,
        region: String,
        #[source]
        source: ClientError,
    },

    /// Any other failure from the service client, unchanged
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The call was cancelled before it completed
    #[error("Operation {0} was cancelled")]
    Cancelled(String),

    /// A bound parameter is not accepted by the operation
    #[error("Operation {operation} has no parameter named '{name}'")]
    UnknownParameter { operation: String, name: String },

    /// A bound value cannot be represented as the parameter's type
    #[error("Invalid value for parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// No operation matches the requested service and name
    #[error("Unknown operation {service}:{operation}")]
    UnknownOperation { service: String, operation: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The blocking adapter could not start its runtime
    #[error("Failed to start async runtime: {0}")]
    Runtime(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl From<ConfigError> for CoreError {
    fn from(err: ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

impl CoreError {
    /// Returns true for DNS and connection failures
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, CoreError::EndpointUnreachable { .. })
    }

    /// Returns true if the service reported a missing resource
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self.service_error() {
            Some((code, status)) => {
                status == 404 || code.ends_with("NotFoundException") || code.ends_with("NotFound")
            }
            None => false,
        }
    }

    /// Returns true if the service rejected the credentials or the caller's permissions
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            CoreError::Client(ClientError::Credentials(_)) => true,
            _ => matches!(
                self.service_error(),
                Some((
                    "AccessDeniedException"
                        | "UnrecognizedClientException"
                        | "InvalidSignatureException"
                        | "ExpiredTokenException",
                    _
                )) | Some((_, 401 | 403))
            ),
        }
    }

    /// Returns true if the service throttled the request
    #[must_use]
    pub fn is_throttling(&self) -> bool {
        matches!(
            self.service_error(),
            Some((
                "ThrottlingException"
                    | "Throttling"
                    | "TooManyRequestsException"
                    | "RequestLimitExceeded"
                    | "ProvisionedThroughputExceededException",
                _
            )) | Some((_, 429))
        )
    }

    /// Returns true for timeouts, including cancellation
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            CoreError::Client(ClientError::Timeout { .. }) | CoreError::Cancelled(_)
        )
    }

    /// Returns true for errors caused by the caller's input
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        match self {
            CoreError::UnknownParameter { .. }
            | CoreError::InvalidParameter { .. }
            | CoreError::UnknownOperation { .. } => true,
            _ => matches!(self.service_error(), Some(("ValidationException", _)) | Some((_, 400)))
                && !self.is_not_found(),
        }
    }

    /// Service error code, if the failure came from the service
    pub fn code(&self) -> Option<&str> {
        self.service_error().map(|(code, _)| code)
    }

    fn service_error(&self) -> Option<(&str, u16)> {
        match self {
            CoreError::Client(ClientError::Service { code, status, .. }) => {
                Some((code.as_str(), *status))
            }
            _ => None,
        }
    }
}
