//! Presentation-ready view of a [`ScanReport`] and the presenter contract.

use serde::{Deserialize, Serialize};

use crate::scanner::{ScanReport, TickerOutcome};

/// Top line of a scan summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Headline {
    MarketClosed,
    NoMatches,
    Matches { count: usize },
}

impl Headline {
    pub fn message(&self) -> String {
        match self {
            Self::MarketClosed => String::from("Market has not opened yet."),
            Self::NoMatches => String::from("No matching stocks found."),
            Self::Matches { count } => format!("Found {count} matching stocks:"),
        }
    }
}

/// One qualifying ticker, with display column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Relative Volume")]
    pub relative_volume: f64,
    #[serde(rename = "Intraday Avg Volume")]
    pub intraday_avg_volume: u64,
    #[serde(rename = "Prev Day Avg Volume")]
    pub prev_day_avg_volume: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub headline: Headline,
    pub rows: Vec<ResultRow>,
    /// `Error processing {TICKER}: {message}` lines, in input order.
    pub errors: Vec<String>,
}

impl ScanSummary {
    pub fn from_report(report: &ScanReport) -> Self {
        if report.market_closed() {
            return Self {
                headline: Headline::MarketClosed,
                rows: Vec::new(),
                errors: Vec::new(),
            };
        }

        let rows: Vec<ResultRow> = report
            .hits()
            .map(|result| ResultRow {
                ticker: result.ticker.to_string(),
                relative_volume: result.relative_volume,
                intraday_avg_volume: result.intraday_avg_volume,
                prev_day_avg_volume: result.prev_day_avg_volume,
            })
            .collect();

        let errors = report.errors().filter_map(error_line).collect();

        let headline = if rows.is_empty() {
            Headline::NoMatches
        } else {
            Headline::Matches { count: rows.len() }
        };

        Self {
            headline,
            rows,
            errors,
        }
    }
}

impl From<&ScanReport> for ScanSummary {
    fn from(report: &ScanReport) -> Self {
        Self::from_report(report)
    }
}

fn error_line(outcome: &TickerOutcome) -> Option<String> {
    let message = outcome.error_message()?;
    Some(format!("Error processing {}: {}", outcome.ticker(), message))
}

/// Renders a [`ScanSummary`] somewhere (terminal table, JSON document, ...).
pub trait ResultPresenter {
    type Error;

    fn present(&mut self, summary: &ScanSummary) -> Result<(), Self::Error>;
}
