//! Call dispatch: await the client, honour cancellation, translate network failures
//!
//! Exactly one translation rule applies here. DNS and connection failures become
//! [`CoreError::EndpointUnreachable`] naming the endpoint and region, with the
//! original error kept as the source. Everything else passes through unchanged.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::client::{ClientError, ServiceClient};
use crate::error::{CoreError, Result};
use crate::operation::OperationSpec;
use crate::session::SessionConfig;

/// Cooperative cancellation for in-flight remote calls
///
/// Clones share the same signal. Only the remote call itself observes it.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // The sender lives as long as self, so this cannot close; never resolve.
            std::future::pending::<()>().await;
        }
    }
}

/// Executes single remote calls on behalf of the invocation pipeline
pub struct Dispatcher<'a> {
    client: &'a dyn ServiceClient,
    cancel: Option<CancelHandle>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(client: &'a dyn ServiceClient) -> Self {
        Self {
            client,
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Make one remote call
    pub async fn call(
        &self,
        operation: &OperationSpec,
        session: &SessionConfig,
        request: Value,
    ) -> Result<Value> {
        let name = operation.qualified_name();
        debug!("Dispatching {}", name);
        trace!("Request body: {}", request);
        let start = Instant::now();

        let result = match &self.cancel {
            Some(cancel) => {
                if cancel.is_cancelled() {
                    return Err(CoreError::Cancelled(name));
                }
                tokio::select! {
                    result = self.client.invoke(operation, session, request) => result,
                    _ = cancel.cancelled() => {
                        debug!("{} cancelled after {:?}", name, start.elapsed());
                        return Err(CoreError::Cancelled(name));
                    }
                }
            }
            None => self.client.invoke(operation, session, request).await,
        };

        debug!("{} finished in {:?}", name, start.elapsed());
        result.map_err(|err| {
            translate(
                err,
                &self.client.endpoint_for(operation, session),
                &session.region,
            )
        })
    }
}

/// Apply the network failure translation rule to a client error
pub fn translate(err: ClientError, endpoint: &str, region: &str) -> CoreError {
    if err.is_network() {
        CoreError::EndpointUnreachable {
            endpoint: endpoint.to_string(),
            region: region.to_string(),
            source: err,
        }
    } else {
        CoreError::Client(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{ConfirmImpact, ServiceSpec};
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;

    static SVC: ServiceSpec = ServiceSpec {
        id: "logs",
        title: "CloudWatch Logs",
        endpoint_prefix: "logs",
        signing_name: "logs",
        target_prefix: "Logs_20140328",
    };

    static OP: OperationSpec = OperationSpec {
        service: &SVC,
        name: "DescribeLogGroups",
        summary: "",
        impact: ConfirmImpact::None,
        target_param: None,
        fields: &[],
        pagination: None,
        default_select: None,
    };

    enum Behaviour {
        Echo,
        Dns,
        Denied,
        Hang,
    }

    struct FakeClient(Behaviour);

    #[async_trait]
    impl ServiceClient for FakeClient {
        async fn invoke(
            &self,
            _operation: &OperationSpec,
            _session: &SessionConfig,
            request: Value,
        ) -> std::result::Result<Value, ClientError> {
            match self.0 {
                Behaviour::Echo => Ok(json!({ "echo": request })),
                Behaviour::Dns => Err(ClientError::NameResolution {
                    host: "logs.nowhere-1.amazonaws.com".to_string(),
                    message: "no such host".to_string(),
                }),
                Behaviour::Denied => Err(ClientError::Service {
                    code: "AccessDeniedException".to_string(),
                    message: "nope".to_string(),
                    status: 400,
                    request_id: None,
                }),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Value::Null)
                }
            }
        }
    }

    #[tokio::test]
    async fn test_success_passes_response_through() {
        let client = FakeClient(Behaviour::Echo);
        let session = SessionConfig::new("us-east-1");
        let response = Dispatcher::new(&client)
            .call(&OP, &session, json!({"limit": 5}))
            .await
            .unwrap();
        assert_eq!(response, json!({"echo": {"limit": 5}}));
    }

    #[tokio::test]
    async fn test_network_failure_is_rewrapped() {
        let client = FakeClient(Behaviour::Dns);
        let session = SessionConfig::new("nowhere-1");
        let err = Dispatcher::new(&client)
            .call(&OP, &session, json!({}))
            .await
            .unwrap_err();
        assert!(err.is_network());
        let msg = err.to_string();
        assert!(msg.contains("https://logs.nowhere-1.amazonaws.com"));
        assert!(msg.contains("'nowhere-1'"));
    }

    #[tokio::test]
    async fn test_other_failures_pass_unchanged() {
        let client = FakeClient(Behaviour::Denied);
        let session = SessionConfig::new("us-east-1");
        let err = Dispatcher::new(&client)
            .call(&OP, &session, json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Client(ClientError::Service { .. })));
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_call() {
        let client = FakeClient(Behaviour::Hang);
        let session = SessionConfig::new("us-east-1");
        let cancel = CancelHandle::new();
        let dispatcher = Dispatcher::new(&client).with_cancel(cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = dispatcher.call(&OP, &session, json!({})).await.unwrap_err();
        assert!(matches!(err, CoreError::Cancelled(_)));
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_already_cancelled_makes_no_call() {
        let client = FakeClient(Behaviour::Hang);
        let session = SessionConfig::new("us-east-1");
        let cancel = CancelHandle::new();
        cancel.cancel();
        let err = Dispatcher::new(&client)
            .with_cancel(cancel)
            .call(&OP, &session, json!({}))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }
}
