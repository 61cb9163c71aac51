mod classify;
mod scan;
mod session;

use chrono::{DateTime, Utc};
use serde_json::Value;
use volscan_core::{EnvelopeError, ProviderId, ScanSummary, UtcDateTime};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// What a command produced, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandView {
    Scan(ScanSummary),
    /// Flat record rendered as `key: value` lines in table mode.
    Record(Value),
}

#[derive(Debug)]
pub struct CommandResult {
    pub view: CommandView,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source_chain: Vec<ProviderId>,
    pub generated_at: UtcDateTime,
}

impl CommandResult {
    pub fn ok(view: CommandView, source_chain: Vec<ProviderId>) -> Self {
        Self {
            view,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain,
            generated_at: UtcDateTime::now(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_generated_at(mut self, generated_at: UtcDateTime) -> Self {
        self.generated_at = generated_at;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Scan(args) => scan::run(cli, args).await,
        Command::Classify(args) => classify::run(cli, args),
        Command::Session(args) => session::run(cli, args),
    }
}

/// `--at` when given, otherwise the wall clock.
fn resolve_now(at: Option<&str>) -> Result<DateTime<Utc>, CliError> {
    match at {
        Some(raw) => Ok(UtcDateTime::parse(raw)?.to_chrono()),
        None => Ok(Utc::now()),
    }
}
