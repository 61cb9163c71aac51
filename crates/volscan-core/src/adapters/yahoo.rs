use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use crate::data_source::{DailyVolumes, MarketDataSource, SourceError};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::{ProviderId, Symbol};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Five calendar days always spans at least two sessions outside long holiday weekends.
const CHART_RANGE: &str = "5d";

/// Yahoo Finance daily-volume adapter backed by the v8 chart endpoint.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    circuit_breaker: Arc<CircuitBreaker>,
    retry: RetryConfig,
    base_url: String,
    timeout_ms: u64,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::default()))
    }
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            auth: HttpAuth::None,
            circuit_breaker: Arc::new(CircuitBreaker::new(
                ProviderId::Yahoo.as_str(),
                CircuitBreakerConfig::default(),
            )),
            retry: RetryConfig::default(),
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    fn chart_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d&includePrePost=false",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            CHART_RANGE,
        )
    }

    async fn fetch_chart(&self, symbol: &Symbol) -> Result<String, SourceError> {
        let url = self.chart_url(symbol);
        let mut attempt = 0_u32;

        loop {
            if !self.circuit_breaker.allow_request() {
                return Err(SourceError::unavailable(
                    "yahoo circuit breaker is open; skipping upstream call",
                ));
            }

            let can_retry = attempt < self.retry.max_retries;
            let request = HttpRequest::get(url.as_str())
                .with_header("referer", "https://finance.yahoo.com/")
                .with_auth(&self.auth)
                .with_timeout_ms(self.timeout_ms);

            debug!(ticker = %symbol, attempt, "requesting yahoo chart");

            match self.http_client.execute(request).await {
                Err(error) => {
                    self.circuit_breaker.record_failure();
                    if can_retry && self.retry.should_retry_transport(&error) {
                        self.pause_before_retry(symbol, attempt, error.message()).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(SourceError::unavailable(format!(
                        "yahoo transport error: {}",
                        error.message()
                    )));
                }
                Ok(response) if response.is_success() => {
                    self.circuit_breaker.record_success();
                    return Ok(response.body);
                }
                Ok(response) if response.status == 404 => {
                    // Unknown symbol; the provider itself is healthy.
                    self.circuit_breaker.record_success();
                    return Err(not_found(symbol, &response.body));
                }
                Ok(response) => {
                    if response.status == 429 || response.status >= 500 {
                        self.circuit_breaker.record_failure();
                    }
                    if can_retry && self.retry.should_retry_status(response.status) {
                        let reason = format!("status {}", response.status);
                        self.pause_before_retry(symbol, attempt, &reason).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(status_error(&response));
                }
            }
        }
    }

    async fn pause_before_retry(&self, symbol: &Symbol, attempt: u32, reason: &str) {
        let delay = self.retry.delay_for_attempt(attempt);
        warn!(
            ticker = %symbol,
            attempt,
            delay_ms = delay.as_millis() as u64,
            reason,
            "retrying yahoo chart request"
        );
        tokio::time::sleep(delay).await;
    }
}

impl MarketDataSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn daily_volumes<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<DailyVolumes, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let body = self.fetch_chart(symbol).await?;
            let history = parse_chart_volumes(symbol, &body)?;
            DailyVolumes::from_history(symbol.clone(), &history)
        })
    }
}

/// Extracts the oldest-first daily volume history from a chart payload.
///
/// Positions follow the chart's timestamps. A null volume (a session that has
/// not printed yet) reads as zero traded shares so it stays in its own slot.
pub(crate) fn parse_chart_volumes(symbol: &Symbol, body: &str) -> Result<Vec<u64>, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        return Err(SourceError::not_found(format!(
            "yahoo has no chart for {symbol}: {}",
            error.describe()
        )));
    }

    let result = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::not_found(format!("yahoo has no chart for {symbol}")))?;

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::internal("yahoo chart has no quote indicators"))?;

    quote
        .volume
        .into_iter()
        .map(|volume| {
            let volume = volume.unwrap_or(0.0);
            if volume.is_finite() && volume >= 0.0 {
                Ok(volume.trunc() as u64)
            } else {
                Err(SourceError::internal(format!(
                    "yahoo returned invalid volume {volume} for {symbol}"
                )))
            }
        })
        .collect()
}

fn not_found(symbol: &Symbol, body: &str) -> SourceError {
    let detail = serde_json::from_str::<YahooChartResponse>(body)
        .ok()
        .and_then(|response| response.chart.error)
        .map(|error| error.describe())
        .unwrap_or_else(|| String::from("symbol may be delisted"));
    SourceError::not_found(format!("yahoo has no chart for {symbol}: {detail}"))
}

fn status_error(response: &HttpResponse) -> SourceError {
    match response.status {
        429 => SourceError::rate_limited("yahoo rate limited the request (status 429)"),
        401 | 403 => SourceError::unavailable(format!(
            "yahoo rejected the request (status {}); set VOLSCAN_YAHOO_COOKIE if this persists",
            response.status
        )),
        status => SourceError::unavailable(format!("yahoo returned status {status}")),
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

impl YahooChartError {
    fn describe(&self) -> String {
        match &self.description {
            Some(description) if !description.is_empty() => {
                format!("{} ({})", description, self.code)
            }
            _ => self.code.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    volume: Vec<Option<f64>>,
}
