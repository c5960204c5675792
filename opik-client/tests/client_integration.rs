//! End-to-end tests for the client over a real HTTP transport.
//!
//! A wiremock server stands in for the Opik backend, so these tests cover
//! URL building, header merging, retries, timeouts and cancellation through
//! the pooled `reqwest` client.

use std::time::{Duration, Instant};

use opik_client::error::FetchError;
use opik_client::resources::datasets::DatasetItemSource;
use opik_client::{
    ApiError, ClientOptions, ErrorKind, OpikClient, RequestOptions, RetryPolicy, Strictness,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BI_TRACES: &str = "/api/v1/internal/usage/bi-traces";

fn client_for(server: &MockServer) -> OpikClient {
    let options = ClientOptions::new()
        .base_url(format!("{}/api", server.uri()))
        .api_key("sk-test")
        .workspace_name("acme");
    OpikClient::new(options)
        .unwrap()
        .with_retry_policy(RetryPolicy::new().initial_delay(Duration::from_millis(20)))
}

fn bi_traces_body() -> serde_json::Value {
    json!({
        "bi_information": [
            {"workspace_id": "w1", "user": "ana", "count": 12},
            {"workspace_id": "w2", "user": "bo", "count": 3}
        ]
    })
}

#[tokio::test]
async fn bi_traces_success_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BI_TRACES))
        .and(header("authorization", "sk-test"))
        .and(header("Comet-Workspace", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bi_traces_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .system_usage()
        .get_bi_traces(&RequestOptions::new())
        .await;

    assert!(response.is_ok());
    assert_eq!(response.status(), Some(200));
    let body = response.unwrap();
    assert_eq!(body.entries().len(), 2);
    assert_eq!(body.entries()[1].user, "bo");
}

#[tokio::test]
async fn not_found_is_a_status_code_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BI_TRACES))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .system_usage()
        .get_bi_traces(&RequestOptions::new())
        .await;

    let err = response.into_result().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StatusCodeError);
    assert_eq!(err.status_code(), Some(404));
    match err {
        ApiError::Fetch(FetchError::StatusCode { body, .. }) => {
            assert_eq!(body, json!({"message": "not found"}));
        }
        other => panic!("expected a status code error, got {other:?}"),
    }
}

#[tokio::test]
async fn html_body_is_a_non_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BI_TRACES))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>maintenance</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .system_usage()
        .get_bi_traces(&RequestOptions::new())
        .await
        .into_result()
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NonJsonError);
    assert_eq!(err.kind().to_string(), "NonJSONError");
    assert!(err.to_string().contains("<html><body>maintenance</body></html>"));
}

#[tokio::test]
async fn unresponsive_server_times_out_after_the_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BI_TRACES))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let start = Instant::now();
    let err = client_for(&server)
        .system_usage()
        .get_bi_traces(&RequestOptions::new().timeout_in_seconds(1).max_retries(2))
        .await
        .into_result()
        .unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(err.kind(), ErrorKind::TimeoutError);
    assert!(elapsed >= Duration::from_secs(1), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "returned late: {elapsed:?}");
}

#[tokio::test]
async fn two_failures_then_success_takes_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BI_TRACES))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(BI_TRACES))
        .respond_with(ResponseTemplate::new(200).set_body_json(bi_traces_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .system_usage()
        .get_bi_traces(&RequestOptions::new().max_retries(2))
        .await;

    assert!(response.is_ok(), "unexpected failure: {:?}", response.error());
    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 3);
}

#[tokio::test]
async fn exhausted_retries_surface_the_last_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BI_TRACES))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({"attempt": "any"})))
        .expect(3)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .system_usage()
        .get_bi_traces(&RequestOptions::new().max_retries(2))
        .await
        .into_result()
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StatusCodeError);
    assert_eq!(err.status_code(), Some(502));
}

#[tokio::test]
async fn cancellation_wins_over_remaining_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BI_TRACES))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let err = client_for(&server)
        .system_usage()
        .get_bi_traces(
            &RequestOptions::new()
                .timeout_in_seconds(30)
                .max_retries(5)
                .cancellation(token),
        )
        .await
        .into_result()
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CancelledError);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(server.received_requests().await.unwrap().len() <= 1);
}

#[tokio::test]
async fn cancelling_one_call_leaves_others_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BI_TRACES))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(bi_traces_body())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let usage = client.system_usage();
    let cancelled = CancellationToken::new();
    cancelled.cancel();

    let plain = RequestOptions::new();
    let aborted = RequestOptions::new().cancellation(cancelled);
    let (ok, err) = futures::future::join(usage.get_bi_traces(&plain), usage.get_bi_traces(&aborted)).await;

    assert!(ok.is_ok());
    assert_eq!(err.error().map(ApiError::kind), Some(ErrorKind::CancelledError));
}

#[tokio::test]
async fn query_parameters_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/private/datasets"))
        .and(query_param("page", "2"))
        .and(query_param("size", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 2,
            "size": 5,
            "total": 6,
            "content": [{"id": "d6", "name": "last", "owner": "ana"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server)
        .datasets()
        .find_datasets(Some(2), Some(5), None, &RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(page.total, Some(6));
    assert_eq!(page.items()[0].extra.get("owner"), Some(&json!("ana")));
}

#[tokio::test]
async fn unknown_item_source_follows_call_strictness() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/private/datasets/d1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"source": "unexpected", "data": {"q": "?"}}]
        })))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let page = client
        .datasets()
        .get_dataset_items("d1", None, None, &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(
        page.items()[0].source,
        DatasetItemSource::Unrecognized("unexpected".to_string())
    );

    let err = client
        .datasets()
        .get_dataset_items(
            "d1",
            None,
            None,
            &RequestOptions::new().strictness(Strictness::strict()),
        )
        .await
        .into_result()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    let issues = err.as_validation().unwrap().issues();
    assert_eq!(issues[0].path, vec!["response", "content", "[0]", "source"]);
}
