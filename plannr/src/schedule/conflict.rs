//! Collision checks between candidate slots and existing commitments.

use time::{Date, Duration};

use crate::{
    data::{Event, EventInterval, Occurrence},
    error::Result,
    schedule::recurrence::expand_occurrences,
};

/// Whether any of the `busy` intervals overlaps `candidate`.
pub fn has_conflict<'a>(
    busy: impl IntoIterator<Item = &'a EventInterval>,
    candidate: &EventInterval,
) -> bool {
    busy.into_iter().any(|interval| interval.overlaps(candidate))
}

/// Intervals taken up by a participant's occurrences.
pub fn occurrence_intervals(
    occurrences: &[Occurrence],
    default_duration: Duration,
) -> Result<Vec<EventInterval>> {
    occurrences
        .iter()
        .map(|occurrence| occurrence.interval(default_duration))
        .collect()
}

/// Busy time of every event, resolved once for a whole slot search.
#[derive(Debug)]
pub struct Timeline<'a> {
    entries: Vec<Busy<'a>>,
}

#[derive(Debug)]
struct Busy<'a> {
    event: &'a Event,
    intervals: Vec<EventInterval>,
}

impl<'a> Timeline<'a> {
    /// Resolve the occurrences of `events` that can touch `[window_start, window_end)`.
    ///
    /// Multi-day spans are kept whole so a span covering the entire window still counts as
    /// busy. Events that fail to parse are logged and ignored.
    pub fn build(
        events: &'a [Event],
        window_start: Date,
        window_end: Date,
        default_duration: Duration,
    ) -> Self {
        let entries = events
            .iter()
            .filter_map(|event| {
                match busy_intervals(event, window_start, window_end, default_duration) {
                    Ok(intervals) if intervals.is_empty() => None,
                    Ok(intervals) => Some(Busy { event, intervals }),
                    Err(e) => {
                        tracing::warn!("ignoring event `{}` for conflicts: {e}", event.id);
                        None
                    }
                }
            })
            .collect();
        Timeline { entries }
    }

    /// Number of events with an occurrence overlapping `candidate`.
    pub fn conflict_count(&self, candidate: &EventInterval) -> usize {
        self.entries
            .iter()
            .filter(|busy| has_conflict(&busy.intervals, candidate))
            .count()
    }

    /// Whether `attendee` has no event overlapping `candidate`.
    pub fn is_free(&self, attendee: &str, candidate: &EventInterval) -> bool {
        !self
            .entries
            .iter()
            .filter(|busy| busy.event.has_attendee(attendee))
            .any(|busy| has_conflict(&busy.intervals, candidate))
    }
}

fn busy_intervals(
    event: &Event,
    window_start: Date,
    window_end: Date,
    default_duration: Duration,
) -> Result<Vec<EventInterval>> {
    if event.is_multi_day() {
        let span = Occurrence::at_anchor(event)?.interval(default_duration)?;
        return Ok(vec![span]);
    }
    occurrence_intervals(
        &expand_occurrences(event, window_start, window_end)?,
        default_duration,
    )
}
