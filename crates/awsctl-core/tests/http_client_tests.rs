//! HTTP transport tests against a mock endpoint

use awsctl_core::{
    AlwaysConfirm, ClientError, Completion, CoreError, Credentials, Envelope, HttpServiceClient,
    InvocationContext, Invoker, ParamSet, ServiceClient, SessionConfig, catalog,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_for(server: &MockServer) -> SessionConfig {
    SessionConfig::new("us-east-1")
        .with_endpoint_url(server.uri())
        .with_credentials(Credentials::new("AKIDEXAMPLE", "secret"))
}

#[tokio::test]
async fn test_request_is_signed_json_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", "application/x-amz-json-1.1"))
        .and(header("x-amz-target", "AmazonSSM.GetParameter"))
        .and(header_exists("authorization"))
        .and(header_exists("x-amz-date"))
        .and(body_json(json!({"Name": "/app/db", "WithDecryption": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Parameter": {"Name": "/app/db", "Value": "postgres://", "Version": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpServiceClient::new().unwrap();
    let op = catalog::find("ssm", "GetParameter").unwrap();
    let params = ParamSet::new()
        .with("Name", "/app/db")
        .with("WithDecryption", "true");
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &AlwaysConfirm)
        .invoke(InvocationContext::new(op, params, session_for(&server)), &mut out)
        .await;

    assert_eq!(completion, Completion::Completed { pages: 1 });
    assert_eq!(out[0].payload().unwrap()["Version"], 3);
}

#[tokio::test]
async fn test_authorization_scope_uses_signing_name_and_region() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = HttpServiceClient::new().unwrap();
    let op = catalog::find("logs", "DescribeLogGroups").unwrap();
    client
        .invoke(op, &session_for(&server), json!({}))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0]
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
    assert!(auth.contains("/us-east-1/logs/aws4_request"));
    assert!(auth.contains("x-amz-target"));
}

#[tokio::test]
async fn test_pagination_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"projects": ["a", "b"], "nextToken": "A"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"nextToken": "A"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"projects": ["c"]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpServiceClient::new().unwrap();
    let op = catalog::find("codebuild", "ListProjects").unwrap();
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &AlwaysConfirm)
        .invoke(
            InvocationContext::new(op, ParamSet::new(), session_for(&server)),
            &mut out,
        )
        .await;

    assert_eq!(completion, Completion::Completed { pages: 2 });
    assert_eq!(out[0].payload(), Some(&json!(["a", "b"])));
    assert_eq!(out[1].payload(), Some(&json!(["c"])));
    assert_eq!(out[1].next_token(), Some(""));
}

#[tokio::test]
async fn test_service_error_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("x-amzn-requestid", "req-123")
                .set_body_json(json!({
                    "__type": "com.amazonaws.secretsmanager#ResourceNotFoundException",
                    "Message": "Secrets Manager can't find the specified secret."
                })),
        )
        .mount(&server)
        .await;

    let client = HttpServiceClient::new().unwrap();
    let op = catalog::find("secretsmanager", "GetSecretValue").unwrap();
    let err = client
        .invoke(op, &session_for(&server), json!({"SecretId": "missing"}))
        .await
        .unwrap_err();

    match err {
        ClientError::Service {
            code,
            message,
            status,
            request_id,
        } => {
            assert_eq!(code, "ResourceNotFoundException");
            assert!(message.contains("can't find"));
            assert_eq!(status, 400);
            assert_eq!(request_id.as_deref(), Some("req-123"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_success_body_is_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = HttpServiceClient::new().unwrap();
    let op = catalog::find("logs", "DeleteLogGroup").unwrap();
    let response = client
        .invoke(op, &session_for(&server), json!({"logGroupName": "g"}))
        .await
        .unwrap();
    assert_eq!(response, json!({}));
}

#[tokio::test]
async fn test_missing_credentials_is_reported() {
    let server = MockServer::start().await;
    let client = HttpServiceClient::new().unwrap();
    let op = catalog::find("dynamodb", "ListTables").unwrap();
    let session = SessionConfig::new("us-east-1").with_endpoint_url(server.uri());

    let err = client.invoke(op, &session, json!({})).await.unwrap_err();
    assert!(matches!(err, ClientError::Credentials(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_refused_connection_is_rewrapped_as_unreachable() {
    let client = HttpServiceClient::new().unwrap();
    let op = catalog::find("dynamodb", "ListTables").unwrap();
    let session = SessionConfig::new("us-east-1")
        .with_endpoint_url("http://127.0.0.1:1")
        .with_credentials(Credentials::new("AKIDEXAMPLE", "secret"));
    let mut out: Vec<Envelope> = Vec::new();

    let completion = Invoker::new(&client, &AlwaysConfirm)
        .invoke(InvocationContext::new(op, ParamSet::new(), session), &mut out)
        .await;

    assert!(completion.is_failure());
    let err = out[0].error().unwrap();
    assert!(err.is_network(), "unexpected error: {err:?}");
    assert!(matches!(err, CoreError::EndpointUnreachable { .. }));
    assert!(err.to_string().contains("http://127.0.0.1:1"));
    assert!(err.to_string().contains("'us-east-1'"));
}
