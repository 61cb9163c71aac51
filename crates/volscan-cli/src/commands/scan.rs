use std::sync::Arc;
use std::time::Instant;

use tracing::debug;
use volscan_core::{
    EnvelopeError, FixtureSource, HttpAuth, MarketDataSource, ScanReport, ScanSummary, TickerList,
    VolumeScanner, YahooAdapter,
};

use crate::cli::{Cli, ScanArgs};
use crate::error::CliError;

use super::{resolve_now, CommandResult, CommandView};

pub async fn run(cli: &Cli, args: &ScanArgs) -> Result<CommandResult, CliError> {
    let config = cli.scan_config()?;
    let now = resolve_now(args.at.as_deref())?;

    let tickers = TickerList::parse(&args.tickers);

    let source: Arc<dyn MarketDataSource> = match &args.fixture {
        Some(path) => {
            debug!(path = %path.display(), "loading volume fixture");
            Arc::new(FixtureSource::from_path(path)?)
        }
        None => {
            let auth = cli
                .yahoo_cookie
                .as_ref()
                .map_or(HttpAuth::None, |cookie| HttpAuth::Cookie(cookie.clone()));
            Arc::new(
                YahooAdapter::default()
                    .with_auth(auth)
                    .with_retry(config.retry())
                    .with_timeout_ms(config.timeout_ms),
            )
        }
    };

    let scanner = VolumeScanner::from_config(source, &config)?;

    let started = Instant::now();
    let report = scanner.scan(&tickers, now).await;
    let latency_ms = started.elapsed().as_millis() as u64;

    let errors = envelope_errors(&report)?;
    let generated_at = report.generated_at;
    let provider = report.provider;

    Ok(
        CommandResult::ok(CommandView::Scan(ScanSummary::from_report(&report)), vec![provider])
            .with_errors(errors)
            .with_latency(latency_ms)
            .with_generated_at(generated_at),
    )
}

fn envelope_errors(report: &ScanReport) -> Result<Vec<EnvelopeError>, CliError> {
    report
        .errors()
        .filter_map(|outcome| {
            let code = outcome.error_code()?;
            let message = outcome.error_message()?;
            Some(
                EnvelopeError::new(code, message)
                    .map(|error| error.with_ticker(outcome.ticker())),
            )
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(CliError::from)
}
