//! # Domain Models
//!
//! Canonical domain types for volscan.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, uppercased ticker |
//! | [`TickerList`] | Comma-separated ticker input, in input order |
//! | [`VolumeSample`] | Previous/current volume plus clamped session timing |
//! | [`ClassificationResult`] | Metrics for a qualifying ticker |
//! | [`UtcDateTime`] | UTC timestamp |

mod symbol;
mod timestamp;
mod volume;

pub use symbol::{Symbol, TickerEntry, TickerList};
pub use timestamp::UtcDateTime;
pub use volume::{ClassificationResult, VolumeSample};
