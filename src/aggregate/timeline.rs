//! Sorted instants and the statistics computed over them.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::Timestamped;
use crate::error::{ChatstatError, Result};

/// The longest gap between two consecutive items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Silence {
    /// The instant of the item *before* the gap.
    pub start: DateTime<Utc>,
    /// Length of the gap.
    pub duration: TimeDelta,
}

impl Silence {
    /// The instant of the item that ended the gap.
    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.duration
    }
}

/// The longest run of calendar-consecutive active days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    /// First day of the run.
    pub start: NaiveDate,
    /// Number of days in the run.
    pub days: usize,
}

/// Divisor used by [`TemporalStats::average_per_day`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayDivisor {
    /// Whole days between the first and last item, rounded up.
    #[default]
    SinceFirst,
    /// Calendar dates from the first item's date to the last's, inclusive.
    CalendarDays,
    /// Only dates with at least one item.
    ActiveDays,
}

/// A sorted sequence of instants.
///
/// Built from any [`Timestamped`] items; the original items are not kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    instants: Vec<DateTime<Utc>>,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a timeline from the timestamps of `items`.
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Timestamped,
    {
        Self::from_instants(items.into_iter().map(|item| item.timestamp()).collect())
    }

    /// Builds a timeline from raw instants, sorting them.
    pub fn from_instants(mut instants: Vec<DateTime<Utc>>) -> Self {
        instants.sort();
        Self { instants }
    }

    /// The sorted instants.
    pub fn instants(&self) -> &[DateTime<Utc>] {
        &self.instants
    }

    /// Number of instants.
    pub fn len(&self) -> usize {
        self.instants.len()
    }

    /// Returns `true` if the timeline has no instants.
    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    /// Earliest instant.
    pub fn first(&self) -> Option<DateTime<Utc>> {
        self.instants.first().copied()
    }

    /// Latest instant.
    pub fn last(&self) -> Option<DateTime<Utc>> {
        self.instants.last().copied()
    }
}

impl TemporalStats for Timeline {
    fn timeline(&self) -> &Timeline {
        self
    }
}

/// Temporal statistics over anything that exposes a [`Timeline`].
///
/// Implementors only provide [`timeline`](TemporalStats::timeline); every
/// analyzer therefore computes these numbers the same way.
pub trait TemporalStats {
    /// The timeline the statistics are computed over.
    fn timeline(&self) -> &Timeline;

    /// Total number of items.
    fn total(&self) -> usize {
        self.timeline().len()
    }

    /// Item count per UTC calendar date.
    ///
    /// Only dates with at least one item appear.
    fn per_day(&self) -> BTreeMap<NaiveDate, usize> {
        let mut days = BTreeMap::new();
        for instant in self.timeline().instants() {
            *days.entry(instant.date_naive()).or_insert(0) += 1;
        }
        days
    }

    /// The busiest date and its count. Ties go to the earliest date.
    fn most_per_day(&self) -> Result<(NaiveDate, usize)> {
        extreme_day(&self.per_day(), |candidate, best| candidate > best)
            .ok_or_else(|| ChatstatError::insufficient_data("most per day", 1, 0))
    }

    /// The quietest active date and its count. Ties go to the earliest date.
    ///
    /// Dates without any item are not candidates.
    fn least_per_day(&self) -> Result<(NaiveDate, usize)> {
        extreme_day(&self.per_day(), |candidate, best| candidate < best)
            .ok_or_else(|| ChatstatError::insufficient_data("least per day", 1, 0))
    }

    /// Number of dates with at least one item.
    fn days_with_activity(&self) -> usize {
        self.per_day().len()
    }

    /// Number of dates between the first and last item without any item.
    fn days_without_activity(&self) -> usize {
        calendar_days(self.timeline()).saturating_sub(self.days_with_activity())
    }

    /// The longest gap between consecutive items.
    ///
    /// Ties go to the earliest gap.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::InsufficientData`] for fewer than two items.
    fn longest_silence(&self) -> Result<Silence> {
        let instants = self.timeline().instants();
        let mut best: Option<Silence> = None;
        for pair in instants.windows(2) {
            let duration = pair[1] - pair[0];
            if best.is_none_or(|b| duration > b.duration) {
                best = Some(Silence {
                    start: pair[0],
                    duration,
                });
            }
        }
        best.ok_or_else(|| ChatstatError::insufficient_data("longest silence", 2, instants.len()))
    }

    /// Instant of the item right before the longest gap.
    fn datetime_of_longest_silence(&self) -> Result<DateTime<Utc>> {
        self.longest_silence().map(|silence| silence.start)
    }

    /// Longest run of calendar-consecutive active days.
    ///
    /// Ties go to the earliest run.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::InsufficientData`] for fewer than two items.
    fn most_consecutive_days(&self) -> Result<Streak> {
        let len = self.timeline().len();
        if len < 2 {
            return Err(ChatstatError::insufficient_data("most consecutive days", 2, len));
        }

        let mut best: Option<Streak> = None;
        let mut previous: Option<NaiveDate> = None;
        let mut run = Streak {
            start: NaiveDate::MIN,
            days: 0,
        };
        for date in self.per_day().into_keys() {
            if previous.and_then(|prev| prev.succ_opt()) == Some(date) {
                run.days += 1;
            } else {
                run = Streak {
                    start: date,
                    days: 1,
                };
            }
            previous = Some(date);
            if best.is_none_or(|b| run.days > b.days) {
                best = Some(run);
            }
        }
        best.ok_or_else(|| ChatstatError::insufficient_data("most consecutive days", 2, len))
    }

    /// Days between the first and last item.
    ///
    /// Partial days are rounded up when `ceiling` is set and dropped
    /// otherwise. Zero for fewer than two items.
    fn days_since_first(&self, ceiling: bool) -> i64 {
        let timeline = self.timeline();
        let (Some(first), Some(last)) = (timeline.first(), timeline.last()) else {
            return 0;
        };
        let span = last - first;
        let days = span.num_days();
        if ceiling && span > TimeDelta::days(days) {
            days + 1
        } else {
            days
        }
    }

    /// Average number of items per day using the chosen divisor.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::ZeroDenominator`] when the divisor is zero.
    fn average_per_day(&self, divisor: DayDivisor) -> Result<f64> {
        let days = match divisor {
            DayDivisor::SinceFirst => self.days_since_first(true).max(0) as usize,
            DayDivisor::CalendarDays => calendar_days(self.timeline()),
            DayDivisor::ActiveDays => self.days_with_activity(),
        };
        if days == 0 {
            return Err(ChatstatError::zero_denominator("average per day"));
        }
        Ok(self.total() as f64 / days as f64)
    }
}

/// Dates in `[first date, last date]`, inclusive. Zero when empty.
fn calendar_days(timeline: &Timeline) -> usize {
    match (timeline.first(), timeline.last()) {
        (Some(first), Some(last)) => {
            (last.date_naive() - first.date_naive()).num_days() as usize + 1
        }
        _ => 0,
    }
}

fn extreme_day(
    days: &BTreeMap<NaiveDate, usize>,
    better: impl Fn(usize, usize) -> bool,
) -> Option<(NaiveDate, usize)> {
    let mut best: Option<(NaiveDate, usize)> = None;
    for (&date, &count) in days {
        if best.is_none_or(|(_, b)| better(count, b)) {
            best = Some((date, count));
        }
    }
    best
}
