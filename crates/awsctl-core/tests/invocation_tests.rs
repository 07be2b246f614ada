//! End-to-end invocation behaviour against a scripted in-memory client

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use awsctl_core::envelope::{NOTE_NEXT_TOKEN, NOTE_PAGE_NUMBER, NOTE_WARNINGS};
use awsctl_core::{
    AlwaysConfirm, ClientError, Completion, ConfirmRequest, CoreError, Envelope,
    InvocationContext, InvocationOptions, Invoker, NeverConfirm, OperationSpec, PaginationMode,
    ParamSet, Selector, ServiceClient, SessionConfig, catalog,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

/// Serves pages keyed by the incoming token and records every request body
#[derive(Default)]
struct ScriptedClient {
    token_member: &'static str,
    next_member: &'static str,
    items_member: &'static str,
    pages: HashMap<Option<String>, (Vec<&'static str>, &'static str)>,
    fail_on: Option<String>,
    calls: Mutex<Vec<Value>>,
}

impl ScriptedClient {
    /// Pages: None -> "A", "A" -> "B", "B" -> ""
    fn three_pages() -> Self {
        let mut pages = HashMap::new();
        pages.insert(None, (vec!["p1", "p2"], "A"));
        pages.insert(Some("A".to_string()), (vec!["p3"], "B"));
        pages.insert(Some("B".to_string()), (vec!["p4"], ""));
        Self {
            token_member: "nextToken",
            next_member: "nextToken",
            items_member: "projects",
            pages,
            ..Self::default()
        }
    }

    fn failing_on(mut self, token: &str) -> Self {
        self.fail_on = Some(token.to_string());
        self
    }

    fn calls(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServiceClient for ScriptedClient {
    async fn invoke(
        &self,
        _operation: &OperationSpec,
        _session: &SessionConfig,
        request: Value,
    ) -> Result<Value, ClientError> {
        self.calls.lock().unwrap().push(request.clone());
        let token = request
            .get(self.token_member)
            .and_then(Value::as_str)
            .map(str::to_string);

        if token.is_some() && token == self.fail_on {
            return Err(ClientError::Service {
                code: "InternalFailure".to_string(),
                message: "simulated".to_string(),
                status: 500,
                request_id: None,
            });
        }

        let (items, next) = self
            .pages
            .get(&token)
            .cloned()
            .unwrap_or((Vec::new(), ""));
        Ok(json!({ self.items_member: items, self.next_member: next }))
    }
}

/// Responds with a fixed value and counts calls
struct CountingClient {
    calls: AtomicUsize,
    result: fn() -> Result<Value, ClientError>,
}

impl CountingClient {
    fn new(result: fn() -> Result<Value, ClientError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            result,
        }
    }
}

#[async_trait]
impl ServiceClient for CountingClient {
    async fn invoke(
        &self,
        _operation: &OperationSpec,
        _session: &SessionConfig,
        _request: Value,
    ) -> Result<Value, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.result)()
    }
}

fn session() -> SessionConfig {
    SessionConfig::new("us-east-1")
}

fn list_projects() -> &'static OperationSpec {
    catalog::find("codebuild", "ListProjects").unwrap()
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_auto_mode_follows_tokens_until_exhausted() {
    let client = ScriptedClient::three_pages();
    let ctx = InvocationContext::new(list_projects(), ParamSet::new(), session());
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;

    assert_eq!(completion, Completion::Completed { pages: 3 });
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].payload(), Some(&json!(["p1", "p2"])));
    assert_eq!(out[1].payload(), Some(&json!(["p3"])));
    assert_eq!(out[2].payload(), Some(&json!(["p4"])));
    assert_eq!(out[2].next_token(), Some(""));
    assert_eq!(out[2].note(NOTE_PAGE_NUMBER), Some(&json!(3)));

    let tokens: Vec<_> = client
        .calls()
        .iter()
        .map(|c| c.get("nextToken").cloned())
        .collect();
    assert_eq!(tokens, vec![None, Some(json!("A")), Some(json!("B"))]);
}

#[tokio::test]
async fn test_manual_mode_with_token_fetches_one_page() {
    let client = ScriptedClient::three_pages();
    let ctx = InvocationContext::new(list_projects(), ParamSet::new(), session())
        .with_mode(PaginationMode::Manual(Some("B".to_string())));
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;

    assert_eq!(completion, Completion::Completed { pages: 1 });
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].payload(), Some(&json!(["p4"])));
    assert_eq!(out[0].next_token(), Some(""));
    assert_eq!(client.calls().len(), 1);
    assert_eq!(client.calls()[0]["nextToken"], json!("B"));
}

#[tokio::test]
async fn test_manual_mode_without_token_reports_next_token() {
    let client = ScriptedClient::three_pages();
    let ctx = InvocationContext::new(list_projects(), ParamSet::new(), session())
        .with_mode(PaginationMode::Manual(None));
    let mut out: Vec<Envelope> = Vec::new();

    Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].next_token(), Some("A"));
    assert_eq!(out[0].note(NOTE_NEXT_TOKEN), Some(&json!("A")));
    assert!(client.calls()[0].get("nextToken").is_none());
}

#[tokio::test]
async fn test_max_pages_caps_auto_mode() {
    let client = ScriptedClient::three_pages();
    let ctx = InvocationContext::new(list_projects(), ParamSet::new(), session()).with_options(
        InvocationOptions {
            max_pages: Some(2),
            ..InvocationOptions::default()
        },
    );
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;

    assert_eq!(completion, Completion::Completed { pages: 2 });
    assert_eq!(out[1].next_token(), Some("B"));
    assert_eq!(client.calls().len(), 2);
}

#[tokio::test]
async fn test_repeated_token_stops_auto_mode() {
    let mut pages = HashMap::new();
    pages.insert(None, (vec!["x"], "LOOP"));
    pages.insert(Some("LOOP".to_string()), (vec!["y"], "LOOP"));
    let client = ScriptedClient {
        token_member: "nextToken",
        next_member: "nextToken",
        items_member: "projects",
        pages,
        ..ScriptedClient::default()
    };
    let ctx = InvocationContext::new(list_projects(), ParamSet::new(), session());
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;

    assert_eq!(completion, Completion::Completed { pages: 2 });
    assert_eq!(client.calls().len(), 2);
    // The stuck token is not offered for resumption
    assert_eq!(out[1].next_token(), Some(""));
}

#[tokio::test]
async fn test_operation_specific_token_members_are_used() {
    let mut pages = HashMap::new();
    pages.insert(None, (vec!["t1"], "t1"));
    pages.insert(Some("t1".to_string()), (vec!["t2"], ""));
    let client = ScriptedClient {
        token_member: "ExclusiveStartTableName",
        next_member: "LastEvaluatedTableName",
        items_member: "TableNames",
        pages,
        ..ScriptedClient::default()
    };
    let op = catalog::find("dynamodb", "ListTables").unwrap();
    let params = ParamSet::new().with("Limit", "1");
    let mut out: Vec<Envelope> = Vec::new();

    Invoker::new(&client, &AlwaysConfirm)
        .invoke(InvocationContext::new(op, params, session()), &mut out)
        .await;

    assert_eq!(out.len(), 2);
    let calls = client.calls();
    assert_eq!(calls[0], json!({"Limit": 1}));
    assert_eq!(calls[1], json!({"Limit": 1, "ExclusiveStartTableName": "t1"}));
}

// ---------------------------------------------------------------------------
// Error containment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_failure_mid_pagination_keeps_emitted_pages() {
    let client = ScriptedClient::three_pages().failing_on("A");
    let ctx = InvocationContext::new(list_projects(), ParamSet::new(), session());
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;

    assert_eq!(completion, Completion::Failed { pages_emitted: 1 });
    assert_eq!(out.len(), 2);
    assert!(out[0].is_success());
    assert!(!out[1].is_success());
    assert!(out[1].payload().is_none());
    assert_eq!(out[1].error().and_then(|e| e.code()), Some("InternalFailure"));
    assert_eq!(client.calls().len(), 2);
}

#[tokio::test]
async fn test_network_failure_becomes_endpoint_unreachable_envelope() {
    let client = CountingClient::new(|| {
        Err(ClientError::NameResolution {
            host: "codebuild.xx-fake-1.amazonaws.com".to_string(),
            message: "dns error".to_string(),
        })
    });
    let ctx = InvocationContext::new(list_projects(), ParamSet::new(), SessionConfig::new("xx-fake-1"));
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;

    assert!(completion.is_failure());
    let err = out[0].error().unwrap();
    assert!(matches!(err, CoreError::EndpointUnreachable { .. }));
    assert!(err.to_string().contains("https://codebuild.xx-fake-1.amazonaws.com"));
}

#[tokio::test]
async fn test_service_failure_is_passed_through_unchanged() {
    let client = CountingClient::new(|| {
        Err(ClientError::Service {
            code: "ResourceNotFoundException".to_string(),
            message: "Secret not found".to_string(),
            status: 400,
            request_id: Some("abc".to_string()),
        })
    });
    let op = catalog::find("secretsmanager", "GetSecretValue").unwrap();
    let ctx = InvocationContext::new(op, ParamSet::new().with("SecretId", "x"), session());
    let mut out: Vec<Envelope> = Vec::new();

    Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;

    let err = out[0].error().unwrap();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "ResourceNotFoundException: Secret not found (HTTP 400)");
}

#[tokio::test]
async fn test_unknown_parameter_fails_without_calling() {
    let client = CountingClient::new(|| Ok(json!({})));
    let ctx = InvocationContext::new(
        list_projects(),
        ParamSet::new().with("Bogus", "1"),
        session(),
    );
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;

    assert_eq!(completion, Completion::Failed { pages_emitted: 0 });
    assert!(matches!(out[0].error(), Some(CoreError::UnknownParameter { .. })));
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Confirmation gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_declined_mutation_makes_no_remote_call() {
    let client = CountingClient::new(|| Ok(json!({})));
    let op = catalog::find("codebuild", "DeleteProject").unwrap();
    let ctx = InvocationContext::new(op, ParamSet::new().with("Name", "proj"), session());
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &NeverConfirm).invoke(ctx, &mut out).await;

    assert_eq!(completion, Completion::Declined);
    assert!(out.is_empty());
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_force_overrides_confirmation() {
    let client = CountingClient::new(|| Ok(json!({})));
    let op = catalog::find("codebuild", "DeleteProject").unwrap();
    let ctx = InvocationContext::new(op, ParamSet::new().with("Name", "proj"), session())
        .with_force(true);
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &NeverConfirm).invoke(ctx, &mut out).await;

    assert_eq!(completion, Completion::Completed { pages: 1 });
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    assert_eq!(out[0].payload(), Some(&json!("proj")));
}

#[tokio::test]
async fn test_confirmer_sees_target_resource() {
    let client = CountingClient::new(|| Ok(json!({"Version": 2})));
    let op = catalog::find("ssm", "PutParameter").unwrap();
    let seen = Mutex::new(Vec::new());
    let confirmer = |req: &ConfirmRequest| {
        seen.lock().unwrap().push(req.target.clone());
        true
    };
    let params = ParamSet::new().with("name", "/app/db").with("Value", "x");
    let mut out: Vec<Envelope> = Vec::new();

    Invoker::new(&client, &confirmer)
        .invoke(InvocationContext::new(op, params, session()), &mut out)
        .await;

    assert_eq!(*seen.lock().unwrap(), vec!["/app/db".to_string()]);
    assert_eq!(out[0].payload(), Some(&json!(2)));
}

#[tokio::test]
async fn test_read_only_operations_skip_confirmation() {
    let client = ScriptedClient::three_pages();
    let ctx = InvocationContext::new(list_projects(), ParamSet::new(), session())
        .with_mode(PaginationMode::Manual(None));
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &NeverConfirm).invoke(ctx, &mut out).await;
    assert_eq!(completion, Completion::Completed { pages: 1 });
}

// ---------------------------------------------------------------------------
// Request building through the pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_nested_objects_are_all_or_nothing() {
    let op = catalog::find("codebuild", "CreateProject").unwrap();
    let ctx = InvocationContext::new(
        op,
        ParamSet::new()
            .with("Name", "p")
            .with("ServiceRole", "arn:aws:iam::123456789012:role/cb")
            .with("Source_Type", "no_source")
            .with("Artifacts_Type", "NO_ARTIFACTS")
            .with("BadgeEnabled", "false")
            .with("TimeoutInMinute", "0")
            .with("LogsConfig_CloudWatchLogs_Status", "ENABLED"),
        session(),
    )
    .with_force(true);

    let recorder = Recorder::default();
    let mut out: Vec<Envelope> = Vec::new();
    Invoker::new(&recorder, &AlwaysConfirm)
        .invoke(ctx, &mut out)
        .await;

    let body = recorder.last();
    assert_eq!(
        body,
        json!({
            "name": "p",
            "serviceRole": "arn:aws:iam::123456789012:role/cb",
            "badgeEnabled": false,
            "timeoutInMinutes": 0,
            "source": {"type": "NO_SOURCE"},
            "artifacts": {"type": "NO_ARTIFACTS"},
            "logsConfig": {"cloudWatchLogs": {"status": "ENABLED"}}
        })
    );
    assert!(body.get("environment").is_none());

    let warnings = out[0].note(NOTE_WARNINGS).unwrap().as_array().unwrap();
    assert!(
        warnings
            .iter()
            .any(|w| w.as_str().unwrap().contains("Environment"))
    );
}

#[tokio::test]
async fn test_selector_override_applies_per_page() {
    let client = ScriptedClient::three_pages();
    let ctx = InvocationContext::new(list_projects(), ParamSet::new(), session())
        .with_mode(PaginationMode::Manual(None))
        .with_select(Selector::parse("*"));
    let mut out: Vec<Envelope> = Vec::new();

    Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;

    assert_eq!(
        out[0].payload(),
        Some(&json!({"projects": ["p1", "p2"], "nextToken": "A"}))
    );
}

#[test]
fn test_blocking_adapter_runs_the_same_pipeline() {
    let client = ScriptedClient::three_pages();
    let ctx = InvocationContext::new(list_projects(), ParamSet::new(), session());
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &AlwaysConfirm).invoke_blocking(ctx, &mut out);

    assert_eq!(completion, Completion::Completed { pages: 3 });
    assert_eq!(out.len(), 3);
}

/// Records request bodies and echoes an empty project
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<Value>>,
}

impl Recorder {
    fn last(&self) -> Value {
        self.calls.lock().unwrap().last().cloned().unwrap_or(Value::Null)
    }
}

#[async_trait]
impl ServiceClient for Recorder {
    async fn invoke(
        &self,
        _operation: &OperationSpec,
        _session: &SessionConfig,
        request: Value,
    ) -> Result<Value, ClientError> {
        self.calls.lock().unwrap().push(request);
        Ok(json!({"project": {}}))
    }
}

#[tokio::test]
async fn test_blocking_invoke_inside_runtime_reports_failure() {
    let client = CountingClient::new(|| Ok(json!({})));
    let mut params = ParamSet::new();
    params.bind("Name", "/app/db");
    let op = catalog::find("ssm", "GetParameter").unwrap();
    let ctx = InvocationContext::new(op, params, session());
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &NeverConfirm).invoke_blocking(ctx, &mut out);

    assert_eq!(completion, Completion::Failed { pages_emitted: 0 });
    assert_eq!(out.len(), 1);
    assert!(matches!(out[0].error(), Some(CoreError::Runtime(_))));
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_page_size_sets_limit_member() {
    let client = Recorder::default();
    let op = catalog::find("dynamodb", "ListTables").unwrap();

    let ctx = InvocationContext::new(op, ParamSet::new(), session()).with_page_size(5);
    let mut out: Vec<Envelope> = Vec::new();
    Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;
    assert_eq!(client.last()["Limit"], json!(5));

    let mut params = ParamSet::new();
    params.bind("Limit", 2);
    let ctx = InvocationContext::new(op, params, session()).with_page_size(5);
    Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;
    assert_eq!(client.last()["Limit"], json!(2));
}

#[tokio::test]
async fn test_page_size_ignored_without_limit_member() {
    let client = Recorder::default();
    let ctx = InvocationContext::new(list_projects(), ParamSet::new(), session())
        .with_page_size(5);
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;

    assert_eq!(completion, Completion::Completed { pages: 1 });
    assert_eq!(client.last(), json!({}));
}

#[tokio::test]
async fn test_paginated_payload_defaults_to_page_items() {
    let client = CountingClient::new(|| Ok(json!({"TableNames": ["orders", "users"]})));
    let op = catalog::find("dynamodb", "ListTables").unwrap();
    let ctx = InvocationContext::new(op, ParamSet::new(), session());
    let mut out: Vec<Envelope> = Vec::new();

    Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut out).await;

    assert_eq!(out[0].payload(), Some(&json!(["orders", "users"])));
}
