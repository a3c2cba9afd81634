use std::{cmp, fmt};

use thiserror::Error;
use time::{Duration, PrimitiveDateTime};

type Result<T, E = EventIntervalError> = std::result::Result<T, E>;

/// Half-open `[start, end)` span of naive local time taken up by an occurrence or a
/// candidate meeting slot.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct EventInterval {
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
}

impl EventInterval {
    /// Create interval from start and end times.
    pub fn new(start: PrimitiveDateTime, end: PrimitiveDateTime) -> Result<Self> {
        let interval = Self { start, end };
        interval.validate()?;
        Ok(interval)
    }

    /// Create interval lasting `duration` from `start`.
    pub fn starting_at(start: PrimitiveDateTime, duration: Duration) -> Result<Self> {
        let end = start
            .checked_add(duration)
            .ok_or(EventIntervalError::Overflow { start, duration })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> PrimitiveDateTime {
        self.start
    }

    pub fn end(&self) -> PrimitiveDateTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether the two intervals share any instant.
    ///
    /// Touching intervals (one ends exactly when the other starts) do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }

    fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(EventIntervalError::NegativeRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum EventIntervalError {
    #[error("end time {end} is before start time {start}")]
    NegativeRange {
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    },
    #[error("{start} plus {duration} is out of range")]
    Overflow {
        start: PrimitiveDateTime,
        duration: Duration,
    },
}

/// Chronological by start, longer intervals last
impl Ord for EventInterval {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
    }
}

impl PartialOrd for EventInterval {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EventInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.start, f)?;
        f.write_str(" - ")?;
        fmt::Display::fmt(&self.end, f)
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::datetime};

    use super::{EventInterval, EventIntervalError};

    #[test]
    fn rejects_negative_range() {
        let err = EventInterval::new(datetime!(2024-01-01 10:00), datetime!(2024-01-01 09:00))
            .unwrap_err();
        assert!(matches!(err, EventIntervalError::NegativeRange { .. }));
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let first =
            EventInterval::starting_at(datetime!(2024-01-01 10:00), Duration::hours(1)).unwrap();
        let second =
            EventInterval::starting_at(datetime!(2024-01-01 11:00), Duration::minutes(30))
                .unwrap();
        assert!(!first.overlaps(&second));
        assert!(!second.overlaps(&first));

        let inside =
            EventInterval::starting_at(datetime!(2024-01-01 10:30), Duration::minutes(10))
                .unwrap();
        assert!(first.overlaps(&inside));
        assert!(inside.overlaps(&first));
    }

    #[test]
    fn orders_by_start_then_end() {
        let short =
            EventInterval::starting_at(datetime!(2024-01-01 10:00), Duration::minutes(15))
                .unwrap();
        let long =
            EventInterval::starting_at(datetime!(2024-01-01 10:00), Duration::hours(2)).unwrap();
        let later =
            EventInterval::starting_at(datetime!(2024-01-01 09:00), Duration::hours(1)).unwrap();
        let mut all = vec![long, short, later];
        all.sort();
        assert_eq!(all, vec![later, short, long]);
    }
}
