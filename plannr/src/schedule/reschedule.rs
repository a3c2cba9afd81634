//! Moving an event after one of its occurrences was dragged to a new place.

use time::{Date, PrimitiveDateTime, Time};

use crate::{
    data::{Event, format_date, format_time, split_occurrence_id},
    error::{Result, ScheduleError},
};

/// Where an occurrence was dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A whole-day cell, e.g. in the month grid. The event keeps its time of day.
    Day(Date),
    /// A timed cell, moving the event to this date and time of day.
    At(PrimitiveDateTime),
}

impl DropTarget {
    pub fn date(&self) -> Date {
        match self {
            DropTarget::Day(date) => *date,
            DropTarget::At(at) => at.date(),
        }
    }

    pub fn time(&self) -> Option<Time> {
        match self {
            DropTarget::Day(_) => None,
            DropTarget::At(at) => Some(at.time()),
        }
    }
}

impl From<Date> for DropTarget {
    fn from(date: Date) -> Self {
        DropTarget::Day(date)
    }
}

impl From<PrimitiveDateTime> for DropTarget {
    fn from(at: PrimitiveDateTime) -> Self {
        DropTarget::At(at)
    }
}

/// Copy of `events` with the event behind `occurrence_id` moved to `target`.
///
/// See [`apply_reschedule`].
pub fn reschedule_occurrence(
    events: &[Event],
    occurrence_id: &str,
    target: impl Into<DropTarget>,
) -> Result<Vec<Event>> {
    let mut events = events.to_vec();
    apply_reschedule(&mut events, occurrence_id, target.into())?;
    Ok(events)
}

/// Move the event behind `occurrence_id` to `target`, in place.
///
/// For a recurring event the whole series moves: the anchor is shifted by the number of
/// days between the dragged occurrence and the target, so every occurrence lands on the
/// same weekday / day of month relative to the drop. A one-off event simply takes the
/// target date. A timed target also sets the time of day, and an end date moves along
/// with the start.
///
/// Returns `false`, leaving `events` untouched, when the event no longer exists. Nothing
/// is modified if an error is returned.
pub fn apply_reschedule(
    events: &mut [Event],
    occurrence_id: &str,
    target: DropTarget,
) -> Result<bool> {
    let Some((index, dropped_date)) = locate(events, occurrence_id) else {
        tracing::debug!("no event behind occurrence `{occurrence_id}`, nothing to reschedule");
        return Ok(false);
    };
    let event = &mut events[index];

    let anchor = event.anchor_date()?;
    let dragged_from = if event.is_recurring() {
        dropped_date.unwrap_or(anchor)
    } else {
        anchor
    };
    let delta = target.date() - dragged_from;
    let out_of_range = || ScheduleError::DateOutOfRange {
        event_id: event.id.clone(),
    };
    let date = anchor.checked_add(delta).ok_or_else(out_of_range)?;
    let end_date = event
        .parsed_end_date()?
        .map(|end| end.checked_add(delta).ok_or_else(out_of_range))
        .transpose()?;

    tracing::debug!(
        "moving event `{}` by {} days to {date}",
        event.id,
        delta.whole_days()
    );
    event.date = format_date(date);
    event.end_date = end_date.map(format_date);
    if let Some(time) = target.time() {
        event.time = format_time(time);
    }
    Ok(true)
}

/// Index of the event behind `occurrence_id` and the date of the dragged occurrence, if the
/// id carries one.
fn locate(events: &[Event], occurrence_id: &str) -> Option<(usize, Option<Date>)> {
    let position = |id: &str| events.iter().position(|event| event.id == id);
    match split_occurrence_id(occurrence_id) {
        (base, Some(date)) => position(base)
            .map(|index| (index, Some(date)))
            .or_else(|| position(occurrence_id).map(|index| (index, None))),
        (id, None) => position(id).map(|index| (index, None)),
    }
}
