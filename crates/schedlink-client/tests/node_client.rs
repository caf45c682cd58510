//! NodeClient behaviour against a scripted transport.
//!
//! The node-local API reports every error with one status code; these tests
//! pin down how stats and log responses are classified.

mod common;

use std::sync::Arc;

use http::StatusCode;
use schedlink_client::{ApiBase, ApiError, NodeClient};
use schedlink_model::{AllocationId, ByteSize, LogStream, TaskName};

use common::*;

const NODE: &str = "http://10.0.0.1:4646";

fn node(transport: &Arc<ScriptedTransport>) -> NodeClient<ScriptedTransport> {
    NodeClient::with_shared_transport(ApiBase::parse(NODE).unwrap(), Arc::clone(transport))
}

fn alloc() -> AllocationId {
    AllocationId::new("8f2c0e1a")
}

#[tokio::test]
async fn stats_are_decoded() {
    let transport = ScriptedTransport::new();
    transport.respond(StatusCode::OK, STATS_JSON);

    let stats = node(&transport)
        .get_allocation_stats(&alloc())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stats.resource_usage.memory_stats.rss, 104_857_600);
    assert_eq!(stats.tasks["api"].resource_usage.cpu_stats.percent, 9.5);

    let requests = transport.requests();
    assert_eq!(
        requests[0].url.as_str(),
        format!("{NODE}/v1/client/allocation/8f2c0e1a/stats")
    );
    assert_eq!(requests[0].accept, "application/json");
}

#[tokio::test]
async fn stats_404_and_garbage_are_indistinguishable() {
    let transport = ScriptedTransport::new();
    transport
        .respond(StatusCode::NOT_FOUND, "")
        .respond(StatusCode::OK, "")
        .respond(StatusCode::OK, "{\"ResourceUsage\":")
        .respond(StatusCode::OK, r#"{"Tasks":{}}"#);
    let client = node(&transport);

    for _ in 0..4 {
        let result = client.get_allocation_stats(&alloc()).await.unwrap();
        assert_eq!(result, Err(ApiError::NotFound));
    }
}

#[tokio::test]
async fn stats_node_error_body_is_not_found() {
    let transport = ScriptedTransport::new();
    transport.respond(
        StatusCode::INTERNAL_SERVER_ERROR,
        "unknown allocation ID \"8f2c0e1a\"",
    );

    let result = node(&transport)
        .get_allocation_stats(&alloc())
        .await
        .unwrap();
    assert_eq!(result, Err(ApiError::NotFound));
}

#[tokio::test]
async fn stats_unreachable_node() {
    let transport = ScriptedTransport::new();
    transport.refuse();

    let result = node(&transport)
        .get_allocation_stats(&alloc())
        .await
        .unwrap();
    assert_eq!(result, Err(ApiError::Unreachable));
}

#[tokio::test]
async fn log_snapshot_query_without_offset() {
    let transport = ScriptedTransport::new();
    transport.respond(StatusCode::OK, "listening on :8080\n");

    let log = node(&transport)
        .get_task_log(&alloc(), &TaskName::new("api"), LogStream::Stdout, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(log.stream, LogStream::Stdout);
    assert_eq!(log.text(), "listening on :8080\n");

    let requests = transport.requests();
    let url = &requests[0].url;
    assert_eq!(url.path(), "/v1/client/fs/logs/8f2c0e1a");
    assert_eq!(
        url.query(),
        Some("task=api&type=stdout&plain=true&follow=false")
    );
    assert_eq!(requests[0].accept, "text/plain");
}

#[tokio::test]
async fn log_snapshot_query_with_offset() {
    let transport = ScriptedTransport::new();
    transport
        .respond(StatusCode::OK, "tail")
        .respond(StatusCode::OK, "tail");
    let client = node(&transport);

    client
        .get_task_log(
            &alloc(),
            &TaskName::new("api"),
            LogStream::Stderr,
            Some(ByteSize::kibibytes(1.5)),
        )
        .await
        .unwrap()
        .unwrap();
    assert!(
        transport
            .last_url()
            .ends_with("type=stderr&plain=true&follow=false&origin=end&offset=1536"),
        "{}",
        transport.last_url()
    );

    client
        .get_task_log(
            &alloc(),
            &TaskName::new("api"),
            LogStream::Stderr,
            Some(ByteSize::bytes(1536.4)),
        )
        .await
        .unwrap()
        .unwrap();
    assert!(transport.last_url().ends_with("&offset=1536"));
}

#[tokio::test]
async fn log_unknown_allocation_is_not_found() {
    let transport = ScriptedTransport::new();
    transport.respond(
        StatusCode::INTERNAL_SERVER_ERROR,
        "unknown allocation ID \"8f2c0e1a\"",
    );

    let result = node(&transport)
        .get_task_log(&alloc(), &TaskName::new("api"), LogStream::Stdout, None)
        .await
        .unwrap();
    assert_eq!(result, Err(ApiError::NotFound));
}

#[tokio::test]
async fn log_other_node_error_is_unexpected() {
    init_tracing();
    let transport = ScriptedTransport::new();
    transport.respond(
        StatusCode::INTERNAL_SERVER_ERROR,
        "failed to find task with name \"db\"",
    );

    let result = node(&transport)
        .get_task_log(&alloc(), &TaskName::new("db"), LogStream::Stdout, None)
        .await
        .unwrap();
    match result {
        Err(ApiError::Unexpected(response)) => {
            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(response.body_text().contains("\"db\""));
        }
        other => panic!("expected Unexpected, got {other:?}"),
    }
}

#[tokio::test]
async fn log_404_follows_general_rule() {
    let transport = ScriptedTransport::new();
    transport.respond(StatusCode::NOT_FOUND, "");

    let result = node(&transport)
        .get_task_log(&alloc(), &TaskName::new("api"), LogStream::Stdout, None)
        .await
        .unwrap();
    assert_eq!(result, Err(ApiError::NotFound));
}

#[tokio::test]
async fn log_unreachable_node() {
    let transport = ScriptedTransport::new();
    transport.refuse();

    let result = node(&transport)
        .get_task_log(&alloc(), &TaskName::new("api"), LogStream::Stdout, None)
        .await
        .unwrap();
    assert_eq!(result, Err(ApiError::Unreachable));
}

#[tokio::test]
async fn derived_node_client_targets_the_node() {
    let transport = ScriptedTransport::new();
    transport
        .respond(StatusCode::OK, node_json("n1", "10.0.0.9:5656"))
        .respond(StatusCode::OK, STATS_JSON);
    let cluster = cluster(&transport);

    let node = cluster
        .get_node(&schedlink_model::NodeId::new("n1"))
        .await
        .unwrap()
        .unwrap();
    let node_client = cluster.node_client(&node).unwrap();
    node_client
        .get_allocation_stats(&alloc())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        transport.last_url(),
        "http://10.0.0.9:5656/v1/client/allocation/8f2c0e1a/stats"
    );
}

/// Never answers; stands in for a node that accepted the connection and hung.
struct HangingTransport;

impl schedlink_client::Transport for HangingTransport {
    async fn get(
        &self,
        _request: schedlink_client::GetRequest,
    ) -> Result<schedlink_client::RawResponse, schedlink_client::TransportError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn shutdown_signal_cancels_a_hung_call() {
    let client = NodeClient::new(ApiBase::parse(NODE).unwrap(), HangingTransport);
    let (stop, mut shutdown) = tokio::sync::watch::channel(false);

    let alloc = alloc();
    let call = client.get_allocation_stats(&alloc);
    let stopper = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        stop.send(true).unwrap();
    });

    let err = schedlink_client::cancellable(&mut shutdown, call)
        .await
        .unwrap_err();
    assert!(matches!(err, schedlink_client::ClientError::Cancelled));
    stopper.await.unwrap();
}

#[tokio::test]
async fn cancellable_passes_through_completed_calls() {
    let transport = ScriptedTransport::new();
    transport.respond(StatusCode::NOT_FOUND, "");
    let client = node(&transport);
    let (_stop, mut shutdown) = tokio::sync::watch::channel(false);

    let result = schedlink_client::cancellable(&mut shutdown, client.get_allocation_stats(&alloc()))
        .await
        .unwrap();
    assert_eq!(result, Err(ApiError::NotFound));
}
