//! Relative-volume and intraday-pace classifier.
//!
//! A ticker is a hit when today's volume so far sits inside the relative
//! volume band of yesterday's full session *and* today's per-minute pace beats
//! yesterday's per-minute average:
//!
//! ```text
//! rvol         = current / previous
//! intraday_avg = current / elapsed_minutes
//! prev_avg     = previous / session_length_minutes
//!
//! hit  <=>  min <= rvol <= max  &&  intraday_avg > prev_avg
//! ```
//!
//! Comparisons use the full-precision ratios. Only the emitted
//! [`ClassificationResult`] fields are rounded (rvol, 2 decimals) or truncated
//! (the two averages).

use serde::{Deserialize, Serialize};

use crate::{ClassificationResult, Symbol, ValidationError, VolumeSample};

/// Standard 9:30-16:00 session length.
pub const DEFAULT_SESSION_MINUTES: u32 = 390;

/// Inclusive relative-volume bounds a ticker must fall within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeVolumeBand {
    pub min: f64,
    pub max: f64,
}

impl Default for RelativeVolumeBand {
    fn default() -> Self {
        Self { min: 1.0, max: 3.0 }
    }
}

impl RelativeVolumeBand {
    pub fn new(min: f64, max: f64) -> Result<Self, ValidationError> {
        let band = Self { min, max };
        band.validate()?;
        Ok(band)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let valid = self.min.is_finite()
            && self.max.is_finite()
            && self.min >= 0.0
            && self.min <= self.max;
        if !valid {
            return Err(ValidationError::InvalidVolumeBand {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn contains(&self, relative_volume: f64) -> bool {
        self.min <= relative_volume && relative_volume <= self.max
    }
}

/// Full-precision metrics computed for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeMetrics {
    pub relative_volume: f64,
    pub intraday_avg_volume: f64,
    pub prev_day_avg_volume: f64,
}

/// Why a sample did or did not qualify.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    /// Previous session traded nothing; no meaningful ratio exists.
    ZeroPreviousVolume,
    NoSignal(VolumeMetrics),
    Hit(VolumeMetrics),
}

impl Evaluation {
    pub const fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub const fn metrics(&self) -> Option<&VolumeMetrics> {
        match self {
            Self::ZeroPreviousVolume => None,
            Self::NoSignal(metrics) | Self::Hit(metrics) => Some(metrics),
        }
    }
}

/// Pure classifier over [`VolumeSample`]s.
///
/// Needs exactly two observations per ticker (previous full session and the
/// current session so far); producing them, and skipping tickers with less
/// history, is the data source's job.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VolumeClassifier {
    band: RelativeVolumeBand,
}

impl VolumeClassifier {
    pub fn new(band: RelativeVolumeBand) -> Result<Self, ValidationError> {
        band.validate()?;
        Ok(Self { band })
    }

    pub const fn band(&self) -> RelativeVolumeBand {
        self.band
    }

    pub fn evaluate(&self, sample: &VolumeSample) -> Evaluation {
        if sample.previous_day_volume == 0 {
            return Evaluation::ZeroPreviousVolume;
        }

        let previous = sample.previous_day_volume as f64;
        let current = sample.current_day_volume as f64;

        let metrics = VolumeMetrics {
            relative_volume: current / previous,
            intraday_avg_volume: current / f64::from(sample.elapsed_minutes()),
            prev_day_avg_volume: previous / f64::from(sample.session_length_minutes()),
        };

        if self.band.contains(metrics.relative_volume)
            && metrics.intraday_avg_volume > metrics.prev_day_avg_volume
        {
            Evaluation::Hit(metrics)
        } else {
            Evaluation::NoSignal(metrics)
        }
    }

    pub fn classify(&self, ticker: &Symbol, sample: &VolumeSample) -> Option<ClassificationResult> {
        match self.evaluate(sample) {
            Evaluation::Hit(metrics) => Some(to_result(ticker, &metrics)),
            Evaluation::ZeroPreviousVolume | Evaluation::NoSignal(_) => None,
        }
    }
}

pub(crate) fn to_result(ticker: &Symbol, metrics: &VolumeMetrics) -> ClassificationResult {
    ClassificationResult {
        ticker: ticker.clone(),
        relative_volume: round_to_cents(metrics.relative_volume),
        intraday_avg_volume: metrics.intraday_avg_volume.trunc() as u64,
        prev_day_avg_volume: metrics.prev_day_avg_volume.trunc() as u64,
    }
}

/// Correctly rounded to two decimals, ties to even.
///
/// Formatting works on the exact binary value, so `1.125` becomes `1.12` and
/// `1.005` (stored just below) becomes `1.00`.
fn round_to_cents(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").expect("valid symbol")
    }

    #[test]
    fn qualifying_sample_produces_rounded_and_truncated_fields() {
        let sample = VolumeSample::new(1_000_000, 1_500_000, 120, DEFAULT_SESSION_MINUTES);
        let result = VolumeClassifier::default()
            .classify(&aapl(), &sample)
            .expect("sample should qualify");

        assert_eq!(result.ticker.as_str(), "AAPL");
        assert_eq!(result.relative_volume, 1.5);
        assert_eq!(result.intraday_avg_volume, 12_500);
        assert_eq!(result.prev_day_avg_volume, 2_564);
    }

    #[test]
    fn relative_volume_above_band_is_rejected() {
        let sample = VolumeSample::new(1_000_000, 3_500_000, 200, DEFAULT_SESSION_MINUTES);
        assert!(VolumeClassifier::default().classify(&aapl(), &sample).is_none());
    }

    #[test]
    fn zero_previous_volume_is_skipped() {
        let sample = VolumeSample::new(0, 500, 60, DEFAULT_SESSION_MINUTES);
        assert_eq!(
            VolumeClassifier::default().evaluate(&sample),
            Evaluation::ZeroPreviousVolume
        );
    }

    #[test]
    fn rounding_applies_only_to_output() {
        // 1_004_999 / 1_000_000 rounds to 1.00 in output but 0.999_999 would not qualify
        let sample = VolumeSample::new(1_000_000, 1_004_999, 60, DEFAULT_SESSION_MINUTES);
        let result = VolumeClassifier::default()
            .classify(&aapl(), &sample)
            .expect("sample should qualify");
        assert_eq!(result.relative_volume, 1.0);

        let below = VolumeSample::new(1_000_000, 999_999, 60, DEFAULT_SESSION_MINUTES);
        assert!(VolumeClassifier::default().classify(&aapl(), &below).is_none());
    }

    #[test]
    fn exact_half_cent_rounds_to_even() {
        let classifier = VolumeClassifier::default();

        let down = VolumeSample::new(1_000_000, 1_125_000, 60, DEFAULT_SESSION_MINUTES);
        let result = classifier.classify(&aapl(), &down).expect("sample should qualify");
        assert_eq!(result.relative_volume, 1.12);

        let up = VolumeSample::new(1_000_000, 1_375_000, 60, DEFAULT_SESSION_MINUTES);
        let result = classifier.classify(&aapl(), &up).expect("sample should qualify");
        assert_eq!(result.relative_volume, 1.38);
    }

    #[test]
    fn custom_band_changes_qualification() {
        let classifier =
            VolumeClassifier::new(RelativeVolumeBand::new(2.0, 5.0).expect("valid band"))
                .expect("valid classifier");
        let sample = VolumeSample::new(1_000_000, 3_500_000, 200, DEFAULT_SESSION_MINUTES);
        assert!(classifier.evaluate(&sample).is_hit());
    }

    #[test]
    fn rejects_inverted_or_non_finite_band() {
        assert!(matches!(
            RelativeVolumeBand::new(3.0, 1.0),
            Err(ValidationError::InvalidVolumeBand { .. })
        ));
        assert!(RelativeVolumeBand::new(f64::NAN, 1.0).is_err());
        assert!(RelativeVolumeBand::new(-1.0, 1.0).is_err());
    }
}
