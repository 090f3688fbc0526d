//! End-to-end dispatcher behaviour against a mock platform API server.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use semut_sdk::appmanager::kvdatabase::{Record, SetRequest};
use semut_sdk::appmanager::worker::DescribeRequest;
use semut_sdk::{Dispatcher, HttpTransport, Operation, RetryPolicy};

fn dispatcher(server: &MockServer) -> Dispatcher<HttpTransport> {
    Dispatcher::new(server.base_url()).with_retry_policy(RetryPolicy::fast())
}

fn describe_request() -> DescribeRequest {
    DescribeRequest {
        deployment_id: String::from("d-1"),
        worker_ids: vec![String::from("w-1")],
        ..DescribeRequest::default()
    }
}

#[tokio::test]
async fn describe_decodes_inline_worker() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/worker/describe")
            .json_body(json!({ "deployment_id": "d-1", "worker_ids": ["w-1"] }));
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"status_code":"200","worker_id":"w-1","name":"web"}"#);
    });

    let workers = describe_request()
        .describe(&dispatcher(&server))
        .await
        .unwrap_or_else(|err| panic!("describe should succeed: {err}"));

    assert_eq!(workers.len(), 1);
    assert_eq!(
        workers.first().map(|worker| worker.worker_id.as_str()),
        Some("w-1")
    );
    mock.assert_calls(1);
}

#[tokio::test]
async fn reads_are_retried_until_attempts_run_out() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/worker/describe");
        then.status(500);
    });

    let err = describe_request()
        .describe(&dispatcher(&server))
        .await
        .expect_err("server error persists");

    assert_eq!(err.code, "502");
    mock.assert_calls(6);
}

#[tokio::test]
async fn mutations_are_sent_once() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/database/set");
        then.status(503);
    });

    let err = SetRequest {
        records: vec![Record::new("colour", "blue")],
    }
    .set(&dispatcher(&server))
    .await
    .expect_err("server unavailable");

    assert_eq!(err.code, "502");
    mock.assert_calls(1);
}

#[tokio::test]
async fn platform_failure_is_surfaced_with_its_code() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/worker/describe");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"status_code":"404","description":"worker not found"}"#);
    });

    let err = describe_request()
        .describe(&dispatcher(&server))
        .await
        .expect_err("platform failure");

    assert_eq!(err.code, "404");
    assert_eq!(err.description, "worker not found");
    mock.assert_calls(1);
}

#[tokio::test]
async fn non_json_reply_is_an_invalid_response() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/worker/describe");
        then.status(200).body("<html>gateway</html>");
    });

    let err = describe_request()
        .describe(&dispatcher(&server))
        .await
        .expect_err("not json");

    assert_eq!(err.code, "500");
    mock.assert_calls(1);
}

#[tokio::test]
async fn unknown_operation_never_reaches_the_server() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST);
        then.status(200).body(r#"{"status_code":"200"}"#);
    });

    let err = dispatcher(&server)
        .execute::<_, serde_json::Value>(Operation::named("WorkerExplode"), &json!({}))
        .await
        .expect_err("unknown operation");

    assert_eq!(err.code, "100");
    mock.assert_calls(0);
}

#[tokio::test]
async fn slow_replies_are_cut_off_by_the_request_timeout() {
    let server = MockServer::start();
    let _mock = server.mock(|when, then| {
        when.method(POST).path("/v1/worker/describe");
        then.status(200)
            .delay(Duration::from_millis(500))
            .header("content-type", "application/json")
            .body(r#"{"status_code":"200","workers":[]}"#);
    });
    let transport = HttpTransport::with_timeout(Duration::from_millis(50))
        .unwrap_or_else(|err| panic!("client should build: {err}"));
    let dispatcher = Dispatcher::with_transport(server.base_url(), transport).with_retry_policy(
        RetryPolicy {
            max_retries: 0,
            ..RetryPolicy::fast()
        },
    );

    let err = describe_request()
        .describe(&dispatcher)
        .await
        .expect_err("attempt times out");

    assert_eq!(err.code, "502");
}
