use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;
use volscan_core::{
    Envelope, EnvelopeError, EnvelopeMeta, ResultPresenter, ResultRow, ScanSummary,
};

use crate::cli::OutputFormat;
use crate::commands::{CommandResult, CommandView};
use crate::error::CliError;

const COLUMNS: [&str; 4] = [
    "Ticker",
    "Relative Volume",
    "Intraday Avg Volume",
    "Prev Day Avg Volume",
];

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    match format {
        OutputFormat::Json => {
            let meta = envelope_meta(result)?;
            let mut presenter = JsonPresenter::new(&mut writer, meta, result.errors.clone(), pretty);
            match &result.view {
                CommandView::Scan(summary) => presenter.present(summary)?,
                CommandView::Record(value) => presenter.write_envelope(value)?,
            }
        }
        OutputFormat::Table => match &result.view {
            CommandView::Scan(summary) => TablePresenter::new(&mut writer).present(summary)?,
            CommandView::Record(value) => {
                render_record(&mut writer, value, &result.errors)?;
                render_warnings(&mut writer, &result.warnings)?;
            }
        },
    }

    writer.flush()?;
    Ok(())
}

fn envelope_meta(result: &CommandResult) -> Result<EnvelopeMeta, CliError> {
    let mut meta = EnvelopeMeta::for_request(result.source_chain.clone(), result.latency_ms)?
        .with_generated_at(result.generated_at);
    for warning in &result.warnings {
        meta.push_warning(warning.clone());
    }
    Ok(meta)
}

/// Human-readable scan output: error lines, headline, then the results table.
pub struct TablePresenter<W: Write> {
    writer: W,
}

impl<W: Write> TablePresenter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ResultPresenter for TablePresenter<W> {
    type Error = io::Error;

    fn present(&mut self, summary: &ScanSummary) -> Result<(), Self::Error> {
        for error in &summary.errors {
            writeln!(self.writer, "{error}")?;
        }

        writeln!(self.writer, "{}", summary.headline.message())?;
        if summary.rows.is_empty() {
            return Ok(());
        }

        let cells: Vec<[String; 4]> = summary.rows.iter().map(row_cells).collect();
        let mut widths = COLUMNS.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let header = COLUMNS.map(String::from);
        write_row(&mut self.writer, &header, &widths)?;
        let rule = widths.map(|width| "-".repeat(width));
        write_row(&mut self.writer, &rule, &widths)?;
        for row in &cells {
            write_row(&mut self.writer, row, &widths)?;
        }

        Ok(())
    }
}

fn row_cells(row: &ResultRow) -> [String; 4] {
    [
        row.ticker.clone(),
        format!("{:.2}", row.relative_volume),
        row.intraday_avg_volume.to_string(),
        row.prev_day_avg_volume.to_string(),
    ]
}

fn write_row<W: Write>(writer: &mut W, cells: &[String; 4], widths: &[usize; 4]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(index, (cell, &width))| {
            if index == 0 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(writer, "{}", line.trim_end())
}

/// Machine-readable output: the summary wrapped in the standard envelope.
pub struct JsonPresenter<W: Write> {
    writer: W,
    meta: EnvelopeMeta,
    errors: Vec<EnvelopeError>,
    pretty: bool,
}

impl<W: Write> JsonPresenter<W> {
    pub fn new(writer: W, meta: EnvelopeMeta, errors: Vec<EnvelopeError>, pretty: bool) -> Self {
        Self {
            writer,
            meta,
            errors,
            pretty,
        }
    }

    pub fn write_envelope<T: Serialize + Clone>(&mut self, data: &T) -> Result<(), CliError> {
        let envelope = Envelope::with_errors(self.meta.clone(), data.clone(), self.errors.clone())?;
        let payload = if self.pretty {
            serde_json::to_string_pretty(&envelope)?
        } else {
            serde_json::to_string(&envelope)?
        };
        writeln!(self.writer, "{payload}")?;
        Ok(())
    }
}

impl<W: Write> ResultPresenter for JsonPresenter<W> {
    type Error = CliError;

    fn present(&mut self, summary: &ScanSummary) -> Result<(), Self::Error> {
        self.write_envelope(summary)
    }
}

fn render_record<W: Write>(
    writer: &mut W,
    value: &Value,
    errors: &[EnvelopeError],
) -> Result<(), CliError> {
    match value {
        Value::Object(fields) => {
            let width = fields.keys().map(String::len).max().unwrap_or(0);
            for (key, field) in fields {
                let rendered = match field {
                    Value::String(text) => text.clone(),
                    other => serde_json::to_string(other)?,
                };
                writeln!(writer, "{key:<width$}: {rendered}")?;
            }
        }
        other => writeln!(writer, "{}", serde_json::to_string_pretty(other)?)?,
    }

    for error in errors {
        writeln!(writer, "error: {}: {}", error.code, error.message)?;
    }
    Ok(())
}

fn render_warnings<W: Write>(writer: &mut W, warnings: &[String]) -> io::Result<()> {
    for warning in warnings {
        writeln!(writer, "warning: {warning}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use volscan_core::{Headline, ProviderId};

    fn summary() -> ScanSummary {
        ScanSummary {
            headline: Headline::Matches { count: 1 },
            rows: vec![ResultRow {
                ticker: String::from("NVDA"),
                relative_volume: 1.5,
                intraday_avg_volume: 12_500,
                prev_day_avg_volume: 2_564,
            }],
            errors: vec![String::from("Error processing ZZZZ: no data")],
        }
    }

    #[test]
    fn table_lists_errors_headline_and_rows() {
        let mut buffer = Vec::new();
        TablePresenter::new(&mut buffer)
            .present(&summary())
            .expect("renders");

        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Error processing ZZZZ: no data");
        assert_eq!(lines[1], "Found 1 matching stocks:");
        assert!(lines[2].starts_with("Ticker  Relative Volume"));
        assert!(lines[4].starts_with("NVDA"));
        assert!(lines[4].contains("1.50"));
        assert!(lines[4].ends_with("2564"));
    }

    #[test]
    fn table_for_closed_market_is_a_single_line() {
        let closed = ScanSummary {
            headline: Headline::MarketClosed,
            rows: Vec::new(),
            errors: Vec::new(),
        };
        let mut buffer = Vec::new();
        TablePresenter::new(&mut buffer)
            .present(&closed)
            .expect("renders");

        assert_eq!(String::from_utf8(buffer).expect("utf8"), "Market has not opened yet.\n");
    }

    #[test]
    fn json_wraps_summary_in_envelope() {
        let meta = EnvelopeMeta::for_request(vec![ProviderId::Fixture], 3).expect("valid meta");
        let errors = vec![EnvelopeError::new("source.not_found", "no data")
            .expect("valid error")
            .with_ticker("ZZZZ")];
        let mut buffer = Vec::new();
        JsonPresenter::new(&mut buffer, meta, errors, false)
            .present(&summary())
            .expect("renders");

        let value: Value = serde_json::from_slice(&buffer).expect("valid json");
        assert_eq!(value["meta"]["schema_version"], "v1.0.0");
        assert_eq!(value["meta"]["source_chain"][0], "fixture");
        assert_eq!(value["data"]["rows"][0]["Ticker"], "NVDA");
        assert_eq!(value["data"]["headline"]["kind"], "matches");
        assert_eq!(value["errors"][0]["ticker"], "ZZZZ");
    }

    #[test]
    fn record_renders_aligned_key_values() {
        let mut buffer = Vec::new();
        let value = serde_json::json!({"phase": "regular", "elapsed_minutes": 120});
        render_record(&mut buffer, &value, &[]).expect("renders");

        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.contains("phase          : regular"));
        assert!(text.contains("elapsed_minutes: 120"));
    }
}
