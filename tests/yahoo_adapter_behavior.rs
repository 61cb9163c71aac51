//! Behavior-driven tests for the Yahoo chart adapter
//!
//! A canned HTTP client stands in for the network so these tests cover payload
//! parsing, error mapping, retries and the circuit breaker deterministically.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use volscan_core::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, HttpAuth, HttpClient, HttpError,
    HttpRequest, HttpResponse, MarketDataSource, RetryConfig, SourceErrorKind, Symbol,
    VolumeClassifier, VolumeSample, YahooAdapter, DEFAULT_SESSION_MINUTES,
};

const NVDA_CHART: &str = r#"{
  "chart": {
    "result": [{
      "meta": {"currency": "USD", "symbol": "NVDA", "exchangeTimezoneName": "America/New_York"},
      "timestamp": [1717075800, 1717162200, 1717421400, 1717507800, 1717594200],
      "indicators": {
        "quote": [{
          "open": [110.0, 112.0, 113.0, 115.0, 118.0],
          "volume": [420000000, 390000000, 305000000, null, 452000000]
        }]
      }
    }],
    "error": null
  }
}"#;

const NOT_FOUND_CHART: &str = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

type CannedReply = Result<HttpResponse, HttpError>;

/// Replays queued replies in order and records every request.
#[derive(Default)]
struct CannedHttpClient {
    replies: Mutex<VecDeque<CannedReply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl CannedHttpClient {
    fn with_replies(replies: Vec<CannedReply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request_count(&self) -> usize {
        self.requests.lock().expect("lock").len()
    }

    fn first_request(&self) -> HttpRequest {
        self.requests.lock().expect("lock")[0].clone()
    }
}

impl HttpClient for CannedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests.lock().expect("lock").push(request);
        let reply = self
            .replies
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::connect("no canned reply left")));
        Box::pin(async move { reply })
    }
}

fn nvda() -> Symbol {
    Symbol::parse("NVDA").expect("valid symbol")
}

fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig::fixed(Duration::from_millis(1), max_retries)
}

// =============================================================================
// Payload parsing
// =============================================================================

#[tokio::test]
async fn last_two_chart_positions_are_previous_and_current() {
    // Given: A five-day chart whose fourth volume is null
    let client = CannedHttpClient::with_replies(vec![Ok(HttpResponse::ok_json(NVDA_CHART))]);
    let adapter = YahooAdapter::new(client.clone());

    // When
    let volumes = adapter.daily_volumes(&nvda()).await.expect("volumes parse");

    // Then: The null day stays in its slot as zero; older days never shift forward
    assert_eq!(volumes.previous_session, 0);
    assert_eq!(volumes.current_session, 452_000_000);
}

#[tokio::test]
async fn when_today_has_not_printed_yesterday_is_not_reported_as_today() {
    // Given: Today's bar is still null
    let body = r#"{"chart":{"result":[{"indicators":{"quote":[{"volume":[900000,1000000,1500000,null]}]}}],"error":null}}"#;
    let client = CannedHttpClient::with_replies(vec![Ok(HttpResponse::ok_json(body))]);
    let adapter = YahooAdapter::new(client);

    // When
    let volumes = adapter.daily_volumes(&nvda()).await.expect("volumes parse");

    // Then: Yesterday is the previous session and today has traded nothing
    assert_eq!(volumes.previous_session, 1_500_000);
    assert_eq!(volumes.current_session, 0);

    // And: The classifier reports no hit at 11:30
    let sample = VolumeSample::new(
        volumes.previous_session,
        volumes.current_session,
        120,
        DEFAULT_SESSION_MINUTES,
    );
    assert!(VolumeClassifier::default().classify(&nvda(), &sample).is_none());
}

#[tokio::test]
async fn requests_target_the_daily_chart_with_auth_headers() {
    // Given: Cookie auth and a local base URL
    let client = CannedHttpClient::with_replies(vec![Ok(HttpResponse::ok_json(NVDA_CHART))]);
    let adapter = YahooAdapter::new(client.clone())
        .with_base_url("http://127.0.0.1:8080")
        .with_auth(HttpAuth::Cookie(String::from("A1=session")))
        .with_timeout_ms(2_500);

    // When
    adapter.daily_volumes(&nvda()).await.expect("volumes parse");

    // Then
    let request = client.first_request();
    assert!(request
        .url
        .starts_with("http://127.0.0.1:8080/v8/finance/chart/NVDA?"));
    assert!(request.url.contains("range=5d"));
    assert!(request.url.contains("interval=1d"));
    assert_eq!(request.timeout_ms, 2_500);
    assert_eq!(
        request.headers.get("cookie").map(String::as_str),
        Some("A1=session")
    );
}

#[tokio::test]
async fn single_day_chart_is_insufficient_history() {
    let body = r#"{"chart":{"result":[{"indicators":{"quote":[{"volume":[1200]}]}}],"error":null}}"#;
    let client = CannedHttpClient::with_replies(vec![Ok(HttpResponse::ok_json(body))]);
    let adapter = YahooAdapter::new(client);

    let error = adapter.daily_volumes(&nvda()).await.expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::InsufficientHistory);
    assert_eq!(error.code(), "source.insufficient_history");
}

// =============================================================================
// Error mapping
// =============================================================================

#[tokio::test]
async fn when_yahoo_reports_unknown_symbol_error_is_not_found() {
    // Given: A 404 with Yahoo's chart error body
    let client = CannedHttpClient::with_replies(vec![Ok(HttpResponse::new(404, NOT_FOUND_CHART))]);
    let adapter = YahooAdapter::new(client.clone()).with_retry(fast_retry(2));

    // When
    let error = adapter.daily_volumes(&nvda()).await.expect_err("must fail");

    // Then: Not retried, not counted against the breaker
    assert_eq!(error.kind(), SourceErrorKind::NotFound);
    assert!(error.message().contains("symbol may be delisted"));
    assert_eq!(client.request_count(), 1);
    assert_eq!(adapter.circuit_state(), CircuitState::Closed);
}

#[tokio::test]
async fn chart_error_inside_a_200_is_not_found() {
    let client = CannedHttpClient::with_replies(vec![Ok(HttpResponse::ok_json(NOT_FOUND_CHART))]);
    let adapter = YahooAdapter::new(client);

    let error = adapter.daily_volumes(&nvda()).await.expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::NotFound);
}

#[tokio::test]
async fn persistent_rate_limiting_surfaces_as_rate_limited() {
    // Given: Every attempt answers 429
    let client = CannedHttpClient::with_replies(vec![
        Ok(HttpResponse::new(429, "Too Many Requests")),
        Ok(HttpResponse::new(429, "Too Many Requests")),
    ]);
    let adapter = YahooAdapter::new(client.clone()).with_retry(fast_retry(1));

    // When
    let error = adapter.daily_volumes(&nvda()).await.expect_err("must fail");

    // Then: One retry, then a retryable rate-limit error
    assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    assert!(error.retryable());
    assert_eq!(client.request_count(), 2);
}

#[tokio::test]
async fn transient_server_error_is_retried_then_succeeds() {
    let client = CannedHttpClient::with_replies(vec![
        Ok(HttpResponse::new(503, "unavailable")),
        Ok(HttpResponse::ok_json(NVDA_CHART)),
    ]);
    let adapter = YahooAdapter::new(client.clone()).with_retry(fast_retry(2));

    let volumes = adapter.daily_volumes(&nvda()).await.expect("recovers");

    assert_eq!(volumes.current_session, 452_000_000);
    assert_eq!(client.request_count(), 2);
    assert_eq!(adapter.circuit_state(), CircuitState::Closed);
}

#[tokio::test]
async fn malformed_payload_is_internal_error() {
    let client =
        CannedHttpClient::with_replies(vec![Ok(HttpResponse::ok_json("<html>oops</html>"))]);
    let adapter = YahooAdapter::new(client);

    let error = adapter.daily_volumes(&nvda()).await.expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::Internal);
    assert!(!error.retryable());
}

// =============================================================================
// Circuit breaker
// =============================================================================

#[tokio::test]
async fn repeated_transport_failures_open_the_circuit() {
    // Given: A breaker that opens after two failures and no retries
    let breaker = Arc::new(CircuitBreaker::new(
        "yahoo",
        CircuitBreakerConfig {
            failure_threshold: 2,
            open_timeout: Duration::from_secs(60),
        },
    ));
    let client = CannedHttpClient::with_replies(vec![
        Err(HttpError::timeout("timed out")),
        Err(HttpError::connect("refused")),
    ]);
    let adapter = YahooAdapter::new(client.clone())
        .with_retry(RetryConfig::no_retry())
        .with_circuit_breaker(breaker);

    // When: Two tickers fail, then a third is attempted
    for _ in 0..2 {
        let error = adapter.daily_volumes(&nvda()).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    }
    let third = adapter.daily_volumes(&nvda()).await.expect_err("must fail");

    // Then: The breaker is open and the third call never reached the client
    assert_eq!(adapter.circuit_state(), CircuitState::Open);
    assert!(third.message().contains("circuit breaker is open"));
    assert_eq!(client.request_count(), 2);
}
