//! Integration tests for the HTTP ticket fetcher against a mock issuer.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use ticketpass::adapters::mock::{InMemoryBrightness, InMemoryCaptureGuard};
use ticketpass::adapters::{HttpTicketFetcher, SystemClock};
use ticketpass::config::ControllerConfig;
use ticketpass::controller::{LifecycleController, Phase};
use ticketpass::error::{ErrorCategory, FetchError};
use ticketpass::traits::{ClockSource, CredentialFetcher};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ticket_body(expires_at: i64) -> serde_json::Value {
    json!({
        "ticketId": "TICKET_8F2K1ZQ0A",
        "signature": "sha256_0f1e2d3c",
        "validSeconds": 60,
        "expiresAt": expires_at
    })
}

#[tokio::test]
async fn test_fetch_parses_ticket_with_bearer_auth() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/ticket"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ticket_body(1_700_000_060_000)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpTicketFetcher::new(format!("{}/v1/ticket", mock_server.uri()))
        .unwrap()
        .with_auth_token("test-token");
    let ticket = fetcher.fetch(CancellationToken::new()).await.unwrap();

    assert_eq!(ticket.id, "TICKET_8F2K1ZQ0A");
    assert_eq!(ticket.signature, "sha256_0f1e2d3c");
    assert_eq!(ticket.issued_for_seconds, 60);
    assert_eq!(ticket.expires_at, 1_700_000_060_000);
}

#[tokio::test]
async fn test_server_error_maps_to_http_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpTicketFetcher::new(mock_server.uri()).unwrap();
    let err = fetcher.fetch(CancellationToken::new()).await.unwrap_err();

    assert_eq!(
        err,
        FetchError::HttpStatus {
            status: 503,
            message: "maintenance".to_string()
        }
    );
    assert!(err.is_retryable());
    assert_eq!(err.category(), ErrorCategory::TransientFetch);
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ticketId": "T"})))
        .mount(&mock_server)
        .await;

    let fetcher = HttpTicketFetcher::new(mock_server.uri()).unwrap();
    let err = fetcher.fetch(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_timeout_maps_to_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ticket_body(0))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let fetcher =
        HttpTicketFetcher::with_timeout(mock_server.uri(), Duration::from_millis(100)).unwrap();
    let err = fetcher.fetch(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout(_)));
}

#[tokio::test]
async fn test_cancellation_aborts_promptly() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ticket_body(0))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpTicketFetcher::new(mock_server.uri()).unwrap();
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = std::time::Instant::now();
    let result = fetcher.fetch(token).await;
    assert_eq!(result, Err(FetchError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_unreachable_issuer_is_connection_error() {
    // Port 9 (discard) is closed on test machines
    let fetcher = HttpTicketFetcher::with_timeout("http://127.0.0.1:9/ticket", Duration::from_secs(2))
        .unwrap();
    let err = fetcher.fetch(CancellationToken::new()).await.unwrap_err();
    assert!(
        matches!(err, FetchError::Connection(_) | FetchError::Timeout(_)),
        "unexpected error {:?}",
        err
    );
}

#[tokio::test]
async fn test_controller_activates_with_http_issuer() {
    let clock = Arc::new(SystemClock::new());
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ticket"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ticket_body(clock.now_millis() + 60_000)),
        )
        .mount(&mock_server)
        .await;

    let config = ControllerConfig::default().with_endpoint(format!("{}/ticket", mock_server.uri()));
    let fetcher = HttpTicketFetcher::from_config(&config).unwrap().unwrap();
    let capture = InMemoryCaptureGuard::new();
    let controller = LifecycleController::builder(
        Arc::new(fetcher),
        Arc::new(capture.clone()),
        Arc::new(InMemoryBrightness::default()),
    )
    .with_clock(clock)
    .with_config(config)
    .spawn()
    .unwrap();

    let handle = controller.handle();
    let mut states = handle.subscribe();
    handle.request_initial_load().unwrap();

    let active = tokio::time::timeout(
        Duration::from_secs(5),
        states.wait_for(|state| state.phase() == Phase::Active),
    )
    .await
    .expect("controller became active")
    .unwrap()
    .clone();
    assert_eq!(active.ticket().unwrap().id, "TICKET_8F2K1ZQ0A");
    assert!(active.seconds_remaining() >= 58);

    controller.shutdown().await;
    assert!(!capture.is_protected());
}
