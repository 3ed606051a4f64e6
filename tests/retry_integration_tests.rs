
use drove_cli::client::{ClientOptions, DroveClient, SessionConfig};
use drove_cli::constants;
use drove_cli::error::{DroveError, DroveErrorKind};
use drove_cli::resilience::{RetryConfig, TimeoutConfig};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use test_helpers::{mount_ping, success};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Answers too slowly for the client timeout `stalls` times, then succeeds
struct StallingResponder {
    stalls: usize,
    calls: Arc<AtomicUsize>,
}

impl Respond for StallingResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.stalls {
            success(json!({"state": "slow"})).set_delay(Duration::from_secs(2))
        } else {
            success(json!({"state": "NORMAL"}))
        }
    }
}

fn options(max_attempts: usize) -> ClientOptions {
    ClientOptions {
        retry: RetryConfig {
            max_attempts,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
            jitter: false,
        },
        timeout: TimeoutConfig {
            connect_timeout_ms: 1_000,
            read_timeout_ms: 200,
        },
    }
}

async fn start(server: &MockServer, max_attempts: usize) -> DroveClient {
    mount_ping(server).await;
    DroveClient::start_with(SessionConfig::new(server.uri()), options(max_attempts))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_read_timeouts_are_retried_until_success() {
    let server = MockServer::start().await;
    let client = start(&server, 3).await;
    let calls = Arc::new(AtomicUsize::new(0));

    Mock::given(method("GET"))
        .and(path(constants::PATH_CLUSTER))
        .respond_with(StallingResponder {
            stalls: 2,
            calls: calls.clone(),
        })
        .mount(&server)
        .await;

    let data = client.get(constants::PATH_CLUSTER, 200).await.unwrap();
    assert_eq!(data["state"], "NORMAL");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retries_exhausted_is_transport_failure() {
    let server = MockServer::start().await;
    let client = start(&server, 2).await;
    let calls = Arc::new(AtomicUsize::new(0));

    Mock::given(method("GET"))
        .and(path(constants::PATH_CLUSTER))
        .respond_with(StallingResponder {
            stalls: usize::MAX,
            calls: calls.clone(),
        })
        .mount(&server)
        .await;

    let err = client.get(constants::PATH_CLUSTER, 200).await.unwrap_err();
    assert_eq!(err.kind, DroveErrorKind::Transport);
    assert_eq!(err.status_code, DroveError::TRANSPORT_STATUS);
    assert!(err.message.starts_with("Error connecting to endpoint"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_http_errors_are_not_retried() {
    let server = MockServer::start().await;
    let client = start(&server, 6).await;

    Mock::given(method("GET"))
        .and(path(constants::PATH_CLUSTER))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get(constants::PATH_CLUSTER, 200).await.unwrap_err();
    assert_eq!(err.kind, DroveErrorKind::HttpStatusMismatch);
    assert_eq!(err.status_code, 503);
}

#[tokio::test]
async fn test_refused_connection_fails_start_with_transport_status() {
    // Reserve a port, then free it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let endpoint = format!("http://127.0.0.1:{port}");
    let err = DroveClient::start_with(SessionConfig::new(&endpoint), options(3))
        .await
        .unwrap_err();

    assert_eq!(err.kind, DroveErrorKind::Transport);
    assert_eq!(err.status_code, -1);
    assert!(err.message.contains(&endpoint));
}
