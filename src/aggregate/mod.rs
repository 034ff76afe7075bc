//! Temporal aggregation primitives shared by every analyzer.
//!
//! - [`Timeline`] — a sorted sequence of instants built from any
//!   [`Timestamped`] items
//! - [`TemporalStats`] — per-day bucketing, silence and streak detection,
//!   averages; implemented once as default methods over a timeline
//! - [`FrequencyTable`] — category counts ranked with first-discovery
//!   tie-breaking
//!
//! # Example
//!
//! ```
//! use chatstat::aggregate::{TemporalStats, Timeline};
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! # fn main() -> chatstat::Result<()> {
//! let timeline = Timeline::from_instants(vec![
//!     Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2024, 1, 1, 15, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap(),
//! ]);
//!
//! let (date, count) = timeline.most_per_day()?;
//! assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
//! assert_eq!(count, 2);
//! assert_eq!(timeline.longest_silence()?.duration.num_hours(), 43);
//! assert_eq!(timeline.days_without_activity(), 1);
//! # Ok(())
//! # }
//! ```

mod frequency;
mod timeline;

pub use frequency::FrequencyTable;
pub use timeline::{DayDivisor, Silence, Streak, TemporalStats, Timeline};

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::message::{Attachment, Message};

/// Anything that happened at a single UTC instant.
pub trait Timestamped {
    /// When the item happened.
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for DateTime<Utc> {
    fn timestamp(&self) -> DateTime<Utc> {
        *self
    }
}

impl Timestamped for Message {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for Attachment {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl<T: Timestamped + ?Sized> Timestamped for &T {
    fn timestamp(&self) -> DateTime<Utc> {
        (**self).timestamp()
    }
}

impl<T: Timestamped + ?Sized> Timestamped for Arc<T> {
    fn timestamp(&self) -> DateTime<Utc> {
        (**self).timestamp()
    }
}
