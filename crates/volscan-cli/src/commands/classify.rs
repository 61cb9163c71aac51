use serde::Serialize;
use volscan_core::{
    ClassificationResult, Evaluation, ProviderId, Symbol, VolumeClassifier, VolumeMetrics,
    VolumeSample,
};

use crate::cli::{ClassifyArgs, Cli};
use crate::error::CliError;

use super::{CommandResult, CommandView};

#[derive(Debug, Serialize)]
struct ClassifyResponseData {
    ticker: Symbol,
    previous_day_volume: u64,
    current_day_volume: u64,
    elapsed_minutes: u32,
    session_length_minutes: u32,
    outcome: &'static str,
    qualifies: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<VolumeMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ClassificationResult>,
}

pub fn run(cli: &Cli, args: &ClassifyArgs) -> Result<CommandResult, CliError> {
    let config = cli.scan_config()?;
    let ticker = Symbol::parse(&args.ticker)?;
    let classifier = VolumeClassifier::new(config.band)?;

    let sample = VolumeSample::new(
        args.previous,
        args.current,
        args.elapsed,
        config.session.length_minutes(),
    );

    let evaluation = classifier.evaluate(&sample);
    let outcome = match evaluation {
        Evaluation::ZeroPreviousVolume => "zero_previous_volume",
        Evaluation::NoSignal(_) => "no_signal",
        Evaluation::Hit(_) => "hit",
    };

    let data = ClassifyResponseData {
        result: classifier.classify(&ticker, &sample),
        ticker,
        previous_day_volume: sample.previous_day_volume,
        current_day_volume: sample.current_day_volume,
        elapsed_minutes: sample.elapsed_minutes(),
        session_length_minutes: sample.session_length_minutes(),
        outcome,
        qualifies: evaluation.is_hit(),
        metrics: evaluation.metrics().copied(),
    };

    let mut result = CommandResult::ok(
        CommandView::Record(serde_json::to_value(&data)?),
        vec![ProviderId::Local],
    );

    if i64::from(sample.elapsed_minutes()) != args.elapsed {
        result = result.with_warning(format!(
            "elapsed minutes {} clamped to {}",
            args.elapsed,
            sample.elapsed_minutes()
        ));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Command;

    fn classify(args: &[&str]) -> CommandResult {
        let cli = Cli::try_parse_from(args).expect("parses");
        let Command::Classify(classify_args) = &cli.command else {
            panic!("expected classify command");
        };
        run(&cli, classify_args).expect("classify succeeds")
    }

    fn record(result: &CommandResult) -> &serde_json::Value {
        match &result.view {
            CommandView::Record(value) => value,
            CommandView::Scan(_) => panic!("expected record view"),
        }
    }

    #[test]
    fn qualifying_sample_reports_result_row() {
        let result = classify(&[
            "volscan", "classify", "--previous", "1000000", "--current", "1500000", "--elapsed",
            "120", "--ticker", "aapl",
        ]);
        let data = record(&result);

        assert_eq!(data["outcome"], "hit");
        assert_eq!(data["result"]["ticker"], "AAPL");
        assert_eq!(data["result"]["relative_volume"], 1.5);
        assert_eq!(data["result"]["intraday_avg_volume"], 12_500);
        assert_eq!(data["result"]["prev_day_avg_volume"], 2_564);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn zero_previous_volume_has_no_metrics() {
        let result = classify(&[
            "volscan", "classify", "--previous", "0", "--current", "500", "--elapsed", "60",
        ]);
        let data = record(&result);

        assert_eq!(data["outcome"], "zero_previous_volume");
        assert_eq!(data["qualifies"], false);
        assert!(data.get("metrics").is_none());
    }

    #[test]
    fn out_of_range_elapsed_is_clamped_with_warning() {
        let result = classify(&[
            "volscan", "classify", "--previous", "10", "--current", "20", "--elapsed", "-5",
        ]);

        assert_eq!(record(&result)["elapsed_minutes"], 1);
        assert_eq!(result.warnings, vec!["elapsed minutes -5 clamped to 1"]);
    }
}
