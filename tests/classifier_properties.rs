//! Behavior-driven tests for the relative-volume classifier
//!
//! These tests pin the qualification rule, its band edges, the guard clauses
//! and the output rounding against worked examples.

use volscan_core::{
    clamp_elapsed_minutes, Evaluation, RelativeVolumeBand, Symbol, TickerList, VolumeClassifier,
    VolumeSample, DEFAULT_SESSION_MINUTES,
};

fn ticker(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

fn sample(previous: u64, current: u64, elapsed: i64) -> VolumeSample {
    VolumeSample::new(previous, current, elapsed, DEFAULT_SESSION_MINUTES)
}

// =============================================================================
// Worked examples
// =============================================================================

#[test]
fn when_volume_is_one_and_a_half_times_yesterday_early_in_the_day_ticker_qualifies() {
    // Given: 1.0M yesterday, 1.5M after 120 minutes
    let classifier = VolumeClassifier::default();
    let sample = sample(1_000_000, 1_500_000, 120);

    // When: The sample is classified
    let result = classifier
        .classify(&ticker("AAPL"), &sample)
        .expect("sample should qualify");

    // Then: Output fields are rounded and truncated
    assert_eq!(result.ticker.as_str(), "AAPL");
    assert_eq!(result.relative_volume, 1.5);
    assert_eq!(result.intraday_avg_volume, 12_500);
    assert_eq!(result.prev_day_avg_volume, 2_564);
}

#[test]
fn when_relative_volume_exceeds_three_ticker_is_not_reported() {
    // Given: Today's volume is 3.5x yesterday's
    let classifier = VolumeClassifier::default();

    // When / Then: No result even though the pace is far ahead
    assert!(classifier
        .classify(&ticker("TSLA"), &sample(1_000_000, 3_500_000, 120))
        .is_none());
}

#[test]
fn when_previous_volume_is_zero_ticker_is_skipped() {
    let classifier = VolumeClassifier::default();

    for (current, elapsed) in [(500, 60), (0, 1), (9_999_999, 390)] {
        let sample = sample(0, current, elapsed);
        assert_eq!(classifier.evaluate(&sample), Evaluation::ZeroPreviousVolume);
        assert!(classifier.classify(&ticker("AMD"), &sample).is_none());
    }
}

#[test]
fn when_ticker_input_has_blanks_and_lowercase_only_real_symbols_remain() {
    // Given: Messy user input
    let list = TickerList::parse("aapl, , tsla");

    // Then: Blank entries vanish and symbols are normalized in order
    let symbols: Vec<&str> = list.symbols().into_iter().map(Symbol::as_str).collect();
    assert_eq!(symbols, vec!["AAPL", "TSLA"]);
}

// =============================================================================
// Band edges and pace comparison
// =============================================================================

#[test]
fn band_edges_are_inclusive() {
    let classifier = VolumeClassifier::default();

    // rvol exactly 1.0 with the pace ahead after one minute
    assert!(classifier
        .classify(&ticker("MSFT"), &sample(390_000, 390_000, 1))
        .is_some());

    // rvol exactly 3.0
    assert!(classifier
        .classify(&ticker("MSFT"), &sample(1_000_000, 3_000_000, 200))
        .is_some());
}

#[test]
fn values_just_outside_the_band_do_not_qualify() {
    let classifier = VolumeClassifier::default();

    // 0.999999 and 3.000001
    assert!(classifier
        .classify(&ticker("AMZN"), &sample(1_000_000, 999_999, 1))
        .is_none());
    assert!(classifier
        .classify(&ticker("AMZN"), &sample(1_000_000, 3_000_001, 100))
        .is_none());
}

#[test]
fn equal_pace_does_not_qualify() {
    // Given: A full session at rvol 1.0, so both paces are 1_000 shares/minute
    let classifier = VolumeClassifier::default();
    let sample = sample(390_000, 390_000, 390);

    // When
    let evaluation = classifier.evaluate(&sample);

    // Then: Strictly greater is required
    let metrics = evaluation.metrics().expect("metrics computed");
    assert_eq!(metrics.intraday_avg_volume, metrics.prev_day_avg_volume);
    assert!(!evaluation.is_hit());
}

#[test]
fn custom_band_is_respected() {
    let classifier =
        VolumeClassifier::new(RelativeVolumeBand::new(2.0, 5.0).expect("valid band"))
            .expect("valid classifier");

    assert!(classifier
        .classify(&ticker("NVDA"), &sample(1_000_000, 3_500_000, 120))
        .is_some());
    assert!(classifier
        .classify(&ticker("NVDA"), &sample(1_000_000, 1_500_000, 120))
        .is_none());
}

// =============================================================================
// Purity and clamping
// =============================================================================

#[test]
fn classification_is_deterministic() {
    let classifier = VolumeClassifier::default();
    let inputs = [
        (1_000_000, 1_500_000, 120),
        (2_000_000, 2_100_000, 389),
        (123_456, 234_567, 45),
        (10, 29, 7),
    ];

    for (previous, current, elapsed) in inputs {
        let sample = sample(previous, current, elapsed);
        let first = classifier.classify(&ticker("GOOGL"), &sample);
        let second = classifier.classify(&ticker("GOOGL"), &sample);
        assert_eq!(first, second);
    }
}

#[test]
fn elapsed_minutes_are_clamped_into_the_session() {
    assert_eq!(clamp_elapsed_minutes(0, 390), 1);
    assert_eq!(clamp_elapsed_minutes(-30, 390), 1);
    assert_eq!(clamp_elapsed_minutes(391, 390), 390);
    assert_eq!(clamp_elapsed_minutes(1_000, 390), 390);
    assert_eq!(clamp_elapsed_minutes(200, 390), 200);

    assert_eq!(sample(1, 1, 0).elapsed_minutes(), 1);
    assert_eq!(sample(1, 1, 600).elapsed_minutes(), 390);
}

#[test]
fn rounding_only_affects_reported_relative_volume() {
    // Given: rvol 1.005, which is inside the band before any rounding
    let classifier = VolumeClassifier::default();
    let sample = sample(1_000_000, 1_005_000, 100);

    // When
    let result = classifier
        .classify(&ticker("AAPL"), &sample)
        .expect("sample should qualify");

    // Then: Two-decimal display value, integer averages
    assert!((result.relative_volume - 1.0).abs() < 0.011);
    assert_eq!(result.intraday_avg_volume, 10_050);
    assert_eq!(result.prev_day_avg_volume, 2_564);
}

#[test]
fn reported_relative_volume_rounds_half_to_even() {
    // Given: rvol exactly 1.125 (9/8)
    let classifier = VolumeClassifier::default();
    let sample = sample(1_000_000, 1_125_000, 60);

    // When
    let result = classifier
        .classify(&ticker("AAPL"), &sample)
        .expect("sample should qualify");

    // Then: The tie goes to the even cent
    assert_eq!(result.relative_volume, 1.12);
}
