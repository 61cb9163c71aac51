//! Exchange session clock.
//!
//! Converts a UTC instant into exchange-local time and derives how far into
//! the regular session it is. Session math is done on the local time-of-day of
//! the local calendar date, so runs shortly after local midnight are reported
//! as pre-open rather than producing negative minute counts.

use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::classifier::DEFAULT_SESSION_MINUTES;
use crate::ValidationError;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Source of the current instant. Injected so scans can be replayed.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Where an instant falls relative to the regular session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Local time is before the open; nothing should be classified.
    PreOpen,
    Regular { elapsed_minutes: u32 },
    /// Session is over; pace is measured against the full session.
    AfterClose { elapsed_minutes: u32 },
}

impl SessionPhase {
    pub const fn elapsed_minutes(&self) -> Option<u32> {
        match self {
            Self::PreOpen => None,
            Self::Regular { elapsed_minutes } | Self::AfterClose { elapsed_minutes } => {
                Some(*elapsed_minutes)
            }
        }
    }

    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::PreOpen)
    }
}

/// Session phase plus the local time it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub timezone: String,
    pub local_time: String,
    #[serde(flatten)]
    pub phase: SessionPhase,
}

/// Regular trading session of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingSession {
    timezone: Tz,
    open: NaiveTime,
    length_minutes: u32,
}

impl Default for TradingSession {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN),
            length_minutes: DEFAULT_SESSION_MINUTES,
        }
    }
}

impl TradingSession {
    pub fn new(timezone: Tz, open: NaiveTime, length_minutes: u32) -> Result<Self, ValidationError> {
        if length_minutes == 0 || length_minutes > MINUTES_PER_DAY {
            return Err(ValidationError::InvalidSessionLength {
                value: length_minutes,
            });
        }

        Ok(Self {
            timezone,
            open,
            length_minutes,
        })
    }

    /// Builds a session from textual settings, e.g. `("America/New_York", "09:30", 390)`.
    pub fn parse(timezone: &str, open: &str, length_minutes: u32) -> Result<Self, ValidationError> {
        let tz = Tz::from_str(timezone.trim()).map_err(|_| ValidationError::InvalidTimezone {
            value: timezone.to_owned(),
        })?;
        let open_time = NaiveTime::parse_from_str(open.trim(), "%H:%M").map_err(|_| {
            ValidationError::InvalidSessionOpen {
                value: open.to_owned(),
            }
        })?;

        Self::new(tz, open_time, length_minutes)
    }

    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    pub const fn open(&self) -> NaiveTime {
        self.open
    }

    pub const fn length_minutes(&self) -> u32 {
        self.length_minutes
    }

    pub fn phase_at(&self, now: DateTime<Utc>) -> SessionPhase {
        let local = now.with_timezone(&self.timezone).time();
        if local < self.open {
            return SessionPhase::PreOpen;
        }

        let raw = i64::from(minute_of_day(local)) - i64::from(minute_of_day(self.open));
        let elapsed_minutes = clamp_elapsed_minutes(raw, self.length_minutes);

        if raw >= i64::from(self.length_minutes) {
            SessionPhase::AfterClose { elapsed_minutes }
        } else {
            SessionPhase::Regular { elapsed_minutes }
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            timezone: self.timezone.name().to_owned(),
            local_time: now.with_timezone(&self.timezone).to_rfc3339(),
            phase: self.phase_at(now),
        }
    }
}

/// Normalizes a raw elapsed-minute count into `1..=session_length_minutes`.
pub fn clamp_elapsed_minutes(raw: i64, session_length_minutes: u32) -> u32 {
    let upper = session_length_minutes.max(1);
    raw.clamp(1, i64::from(upper)) as u32
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}
