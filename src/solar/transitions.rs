//! Upcoming UTC offset changes of a timezone (daylight saving switches and rule changes).
//!
//! chrono-tz does not expose its transition table, so transitions are located by sampling the
//! offset in fixed steps and bisecting the step in which it changed down to the second.

use chrono::{DateTime, FixedOffset, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Sampling interval. Two offset changes closer together than this would go unnoticed.
const SCAN_STEP_SECONDS: i64 = 6 * 3600;
const DAYS_PER_YEAR: i64 = 365;
pub const DEFAULT_HORIZON_YEARS: u32 = 30;
pub const MAX_HORIZON_YEARS: u32 = 1000;

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Timestamp {timestamp} is outside the supported date range while searching {timezone}")]
    OutOfRange {
        timezone: Tz,
        timestamp: i64,
    },
}

/// The instant a timezone switches from one UTC offset to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// First instant with the new offset, in the timezone that changes.
    pub at: DateTime<Tz>,
    pub offset_before: FixedOffset,
    pub offset_after: FixedOffset,
}

#[derive(Debug, Clone, Copy)]
pub struct TransitionFinder {
    horizon: TimeDelta,
}
impl TransitionFinder {
    /// Searches at most `horizon_years` ahead, capped at [`MAX_HORIZON_YEARS`].
    pub fn new(horizon_years: u32) -> TransitionFinder {
        let days = horizon_years.min(MAX_HORIZON_YEARS) as i64 * DAYS_PER_YEAR;
        TransitionFinder { horizon: TimeDelta::try_days(days).unwrap_or(TimeDelta::MAX) }
    }

    /// The first offset change strictly after `after`, or `None` if there is none within the horizon.
    pub fn next_transition(&self, after: &DateTime<Tz>) -> Result<Option<Transition>, TransitionError> {
        let timezone = after.timezone();
        let start = after.timestamp();
        // the scan never samples past the last representable instant
        let end = start.saturating_add(self.horizon.num_seconds())
            .min(DateTime::<Utc>::MAX_UTC.timestamp());
        let offset_before = offset_at(&timezone, start)?;

        let mut low = start;
        while low < end {
            let high = low.saturating_add(SCAN_STEP_SECONDS).min(end);
            let offset_after = offset_at(&timezone, high)?;

            if offset_after != offset_before {
                let changed_at = bisect(&timezone, &offset_before, low, high)?;
                return Ok(Some(Transition {
                    at: utc_at(&timezone, changed_at)?.with_timezone(&timezone),
                    offset_before,
                    offset_after: offset_at(&timezone, changed_at)?,
                }));
            }

            low = high;
        }

        Ok(None)
    }

    /// Lazily walks the transitions following `start`, each search seeded by the previous result.
    pub fn transitions(&self, start: DateTime<Tz>) -> Transitions {
        Transitions { finder: *self, cursor: Some(start) }
    }
}
impl Default for TransitionFinder {
    fn default() -> Self {
        TransitionFinder::new(DEFAULT_HORIZON_YEARS)
    }
}

/// Iterator over upcoming transitions. Stops after the last transition or the first error.
pub struct Transitions {
    finder: TransitionFinder,
    cursor: Option<DateTime<Tz>>,
}
impl Iterator for Transitions {
    type Item = Result<Transition, TransitionError>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.take()?;

        match self.finder.next_transition(&cursor) {
            Ok(Some(transition)) => {
                self.cursor = Some(transition.at);
                Some(Ok(transition))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

// smallest timestamp in (low, high] whose offset differs from `before`, given `high` differs
fn bisect(timezone: &Tz, before: &FixedOffset, mut low: i64, mut high: i64) -> Result<i64, TransitionError> {
    while high - low > 1 {
        let middle = low + (high - low) / 2;
        if offset_at(timezone, middle)? == *before {
            low = middle;
        } else {
            high = middle;
        }
    }

    Ok(high)
}

fn utc_at(timezone: &Tz, timestamp: i64) -> Result<DateTime<Utc>, TransitionError> {
    DateTime::from_timestamp(timestamp, 0)
        .ok_or(TransitionError::OutOfRange { timezone: *timezone, timestamp })
}

fn offset_at(timezone: &Tz, timestamp: i64) -> Result<FixedOffset, TransitionError> {
    let utc = utc_at(timezone, timestamp)?;
    Ok(timezone.offset_from_utc_datetime(&utc.naive_utc()).fix())
}
