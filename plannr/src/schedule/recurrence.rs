//! Expansion of (possibly recurring) events into dated occurrences.

use std::collections::BTreeMap;

use time::{Date, Duration, Month};

use crate::{
    data::{Event, Occurrence, Recurrence},
    error::Result,
};

/// Distance between two consecutive occurrences of a series.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Step {
    Days(i64),
    Months(i64),
}

impl Step {
    fn of(recurrence: Recurrence) -> Option<Self> {
        match recurrence {
            Recurrence::None => None,
            Recurrence::Daily => Some(Step::Days(1)),
            Recurrence::Weekly => Some(Step::Days(7)),
            Recurrence::Monthly => Some(Step::Months(1)),
            Recurrence::Yearly => Some(Step::Months(12)),
        }
    }

    /// Date of the `n`th occurrence, always computed from the anchor so month-end clamping
    /// does not accumulate.
    fn nth(self, anchor: Date, n: i64) -> Option<Date> {
        match self {
            Step::Days(days) => anchor.checked_add(Duration::days(days.checked_mul(n)?)),
            Step::Months(months) => add_months(anchor, months.checked_mul(n)?),
        }
    }

    /// Index of an occurrence on or before `window_start`, so the scan can skip the part of
    /// a long series that lies before the window.
    fn first_index(self, anchor: Date, window_start: Date) -> i64 {
        if window_start <= anchor {
            return 0;
        }
        match self {
            Step::Days(days) => (window_start - anchor).whole_days() / days,
            Step::Months(months) => {
                let elapsed = (i64::from(window_start.year()) - i64::from(anchor.year())) * 12
                    + i64::from(u8::from(window_start.month()))
                    - i64::from(u8::from(anchor.month()));
                ((elapsed - 1) / months).max(0)
            }
        }
    }
}

/// Occurrences of `event` dated inside `[window_start, window_end)`.
///
/// Non-recurring events yield at most one occurrence. Events with an end date are one
/// span and are included when either their start or end date lies in the window.
/// Recurring events step forward from the anchor and stop at `window_end`.
///
/// Fails if the event's dates or times can't be parsed.
pub fn expand_occurrences(
    event: &Event,
    window_start: Date,
    window_end: Date,
) -> Result<Vec<Occurrence>> {
    let anchor = Occurrence::at_anchor(event)?;
    let in_window = |date: Date| window_start <= date && date < window_end;

    if let Some(end_date) = anchor.end_date {
        return Ok(if in_window(anchor.date) || in_window(end_date) {
            vec![anchor]
        } else {
            vec![]
        });
    }

    let Some(step) = Step::of(event.recurrence) else {
        return Ok(if in_window(anchor.date) {
            vec![anchor]
        } else {
            vec![]
        });
    };

    let mut occurrences = vec![];
    let mut n = step.first_index(anchor.date, window_start);
    while let Some(date) = step.nth(anchor.date, n) {
        if date >= window_end {
            break;
        }
        if date >= window_start {
            occurrences.push(anchor.on(date));
        }
        n += 1;
    }
    Ok(occurrences)
}

/// Expand every event over the window, oldest occurrence first.
///
/// Events that fail to parse are logged and left out rather than failing the whole query.
pub fn occurrences_between<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    window_start: Date,
    window_end: Date,
) -> Vec<Occurrence> {
    let mut occurrences: Vec<_> = events
        .into_iter()
        .filter_map(
            |event| match expand_occurrences(event, window_start, window_end) {
                Ok(occurrences) => Some(occurrences),
                Err(e) => {
                    tracing::warn!("skipping event `{}`: {e}", event.id);
                    None
                }
            },
        )
        .flatten()
        .collect();
    occurrences.sort_by(|left, right| {
        left.date
            .cmp(&right.date)
            .then(left.time.cmp(&right.time))
            .then_with(|| left.id.cmp(&right.id))
    });
    occurrences
}

/// Occurrences in the window grouped by the day they start on.
pub fn agenda<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    window_start: Date,
    window_end: Date,
) -> BTreeMap<Date, Vec<Occurrence>> {
    let mut days: BTreeMap<Date, Vec<Occurrence>> = BTreeMap::new();
    for occurrence in occurrences_between(events, window_start, window_end) {
        days.entry(occurrence.date).or_default().push(occurrence);
    }
    days
}

/// Add calendar months, clamping the day to the end of shorter months.
pub fn add_months(date: Date, months: i64) -> Option<Date> {
    let index = i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1;
    let index = index.checked_add(months)?;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = Month::try_from(u8::try_from(index.rem_euclid(12) + 1).ok()?).ok()?;
    (1..=date.day())
        .rev()
        .find_map(|day| Date::from_calendar_date(year, month, day).ok())
}
