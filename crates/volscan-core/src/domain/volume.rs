use serde::{Deserialize, Serialize};

use crate::session::clamp_elapsed_minutes;
use crate::Symbol;

/// Two daily volume observations plus the session timing they are measured against.
///
/// `elapsed_minutes` is always within `1..=session_length_minutes`; the
/// constructor clamps out-of-range inputs instead of rejecting them, and
/// deserialization goes through the same constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawVolumeSample")]
pub struct VolumeSample {
    pub previous_day_volume: u64,
    pub current_day_volume: u64,
    elapsed_minutes: u32,
    session_length_minutes: u32,
}

impl VolumeSample {
    pub fn new(
        previous_day_volume: u64,
        current_day_volume: u64,
        elapsed_minutes: i64,
        session_length_minutes: u32,
    ) -> Self {
        let session_length_minutes = session_length_minutes.max(1);
        Self {
            previous_day_volume,
            current_day_volume,
            elapsed_minutes: clamp_elapsed_minutes(elapsed_minutes, session_length_minutes),
            session_length_minutes,
        }
    }

    pub const fn elapsed_minutes(&self) -> u32 {
        self.elapsed_minutes
    }

    pub const fn session_length_minutes(&self) -> u32 {
        self.session_length_minutes
    }
}

#[derive(Deserialize)]
struct RawVolumeSample {
    previous_day_volume: u64,
    current_day_volume: u64,
    elapsed_minutes: i64,
    session_length_minutes: u32,
}

impl From<RawVolumeSample> for VolumeSample {
    fn from(raw: RawVolumeSample) -> Self {
        Self::new(
            raw.previous_day_volume,
            raw.current_day_volume,
            raw.elapsed_minutes,
            raw.session_length_minutes,
        )
    }
}

/// Output row for a ticker whose volume profile qualified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub ticker: Symbol,
    /// Rounded to two decimals; qualification used the unrounded ratio.
    pub relative_volume: f64,
    pub intraday_avg_volume: u64,
    pub prev_day_avg_volume: u64,
}
