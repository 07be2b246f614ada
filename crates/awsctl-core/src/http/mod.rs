//! HTTP transport for AWS JSON 1.1 services
//!
//! Every call is a signed `POST /` with the operation named in `X-Amz-Target`.
//! Transport failures are classified so the dispatcher can tell a bad host name or
//! refused connection apart from everything else.

mod signing;

pub use signing::SigV4Signer;

use std::collections::BTreeMap;
use std::error::Error as _;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, trace};
use url::Url;

use crate::client::{ClientError, ServiceClient};
use crate::operation::OperationSpec;
use crate::session::SessionConfig;

const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// User agent string for awsctl HTTP requests
const AWSCTL_USER_AGENT: &str = concat!("awsctl/", env!("CARGO_PKG_VERSION"));

/// [`ServiceClient`] that talks to real (or emulated) endpoints over HTTPS
#[derive(Debug, Clone)]
pub struct HttpServiceClient {
    http: reqwest::Client,
}

impl HttpServiceClient {
    pub fn new() -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(AWSCTL_USER_AGENT)
            .build()
            .map_err(|e| ClientError::Http(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http })
    }

    /// Reuse an existing `reqwest` client
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ServiceClient for HttpServiceClient {
    async fn invoke(
        &self,
        operation: &OperationSpec,
        session: &SessionConfig,
        request: Value,
    ) -> Result<Value, ClientError> {
        let endpoint = self.endpoint_for(operation, session);
        let url = Url::parse(&endpoint)
            .map_err(|e| ClientError::Http(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        let credentials = session.credentials.as_ref().ok_or_else(|| {
            ClientError::Credentials(
                "no access key configured; set a profile or AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY"
                    .to_string(),
            )
        })?;

        let body = serde_json::to_vec(&request)
            .map_err(|e| ClientError::Decode(format!("failed to encode request: {}", e)))?;

        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), JSON_CONTENT_TYPE.to_string());
        headers.insert("x-amz-target".to_string(), operation.target());
        SigV4Signer::new(credentials, &session.region, operation.service.signing_name).sign(
            "POST",
            &url,
            &mut headers,
            &body,
            Utc::now(),
        )?;

        debug!("POST {} ({})", url, operation.target());
        let mut builder = self
            .http
            .post(url.clone())
            .timeout(session.timeout)
            .body(body);
        for (name, value) in &headers {
            // reqwest derives Host from the URL
            if name != "host" {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        let response = builder.send().await.map_err(|e| classify(e, &url))?;
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-amzn-requestid")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let error_type = response
            .headers()
            .get("x-amzn-errortype")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(|e| classify(e, &url))?;
        trace!("Response {} ({} bytes)", status, bytes.len());

        if status.is_success() {
            if bytes.is_empty() {
                return Ok(json!({}));
            }
            return serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()));
        }

        Err(service_error(
            status.as_u16(),
            &bytes,
            error_type.as_deref(),
            request_id,
        ))
    }
}

/// Map a transport error onto the client error taxonomy
fn classify(err: reqwest::Error, url: &Url) -> ClientError {
    let endpoint = url.as_str().trim_end_matches('/').to_string();
    if err.is_timeout() {
        return ClientError::Timeout { endpoint };
    }
    if err.is_connect() {
        let message = error_chain(&err);
        if is_name_resolution(&message) {
            return ClientError::NameResolution {
                host: url.host_str().unwrap_or_default().to_string(),
                message,
            };
        }
        return ClientError::Connect { endpoint, message };
    }
    ClientError::Http(error_chain(&err))
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn is_name_resolution(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    [
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "no such host",
        "nodename nor servname",
        "temporary failure in name resolution",
    ]
    .iter()
    .any(|needle| message.contains(needle))
}

/// Parse an AWS JSON error body
///
/// `__type` may be namespaced (`com.amazonaws.x#Code`) or carry a URL suffix
/// (`Code:http://...`); both are stripped.
fn service_error(
    status: u16,
    body: &[u8],
    error_type: Option<&str>,
    request_id: Option<String>,
) -> ClientError {
    let parsed: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let raw_code = parsed
        .get("__type")
        .and_then(Value::as_str)
        .or(error_type)
        .or_else(|| parsed.get("code").and_then(Value::as_str));
    let code = raw_code
        .map(|c| {
            let c = c.rsplit('#').next().unwrap_or(c);
            c.split(':').next().unwrap_or(c).to_string()
        })
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| format!("Http{}", status));

    let message = ["message", "Message", "errorMessage"]
        .iter()
        .find_map(|k| parsed.get(*k).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());

    ClientError::Service {
        code,
        message,
        status,
        request_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_parsing() {
        let body = br#"{"__type":"com.amazonaws.codebuild#ResourceNotFoundException","message":"Project not found"}"#;
        let err = service_error(400, body, None, Some("req-1".to_string()));
        match err {
            ClientError::Service {
                code,
                message,
                status,
                request_id,
            } => {
                assert_eq!(code, "ResourceNotFoundException");
                assert_eq!(message, "Project not found");
                assert_eq!(status, 400);
                assert_eq!(request_id.as_deref(), Some("req-1"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_service_error_fallbacks() {
        let err = service_error(
            400,
            br#"{"Message":"bad"}"#,
            Some("ValidationException:http://internal.amazon.com/"),
            None,
        );
        assert_eq!(err.code(), Some("ValidationException"));

        let err = service_error(503, b"Service Unavailable", None, None);
        assert_eq!(err.code(), Some("Http503"));
        assert!(err.to_string().contains("Service Unavailable"));
    }

    #[test]
    fn test_name_resolution_detection() {
        assert!(is_name_resolution(
            "error sending request: client error (Connect): dns error: failed to lookup address information"
        ));
        assert!(!is_name_resolution("tcp connect error: Connection refused (os error 111)"));
    }
}
