//! Search for the best times to hold a new meeting.

use std::{fmt, str::FromStr};

use anyhow::bail;
use time::{Duration, PrimitiveDateTime};

use crate::{
    config::SchedulerConfig,
    data::{Calendar, DATETIME_DESC, Event, EventInterval, WorkingWindow},
    error::{Result, ScheduleError},
    schedule::{conflict::Timeline, score::score},
};

/// Hours of the day candidate slots may start in, `[start, end)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HourRange {
    pub start: u8,
    pub end: u8,
}

impl HourRange {
    pub fn new(start: u8, end: u8) -> Result<Self> {
        if start >= end || end > 24 {
            return Err(ScheduleError::InvalidHourRange { start, end });
        }
        Ok(HourRange { start, end })
    }
}

impl Default for HourRange {
    fn default() -> Self {
        HourRange { start: 9, end: 17 }
    }
}

/// Parses `START-END`, e.g. `9-17`
impl FromStr for HourRange {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((start, end)) = s.split_once('-') else {
            bail!("expected `START-END`, e.g. `9-17`");
        };
        Ok(HourRange::new(start.trim().parse()?, end.trim().parse()?)?)
    }
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// What the user asked the assistant to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRequest {
    pub required_attendees: Vec<String>,
    pub optional_attendees: Vec<String>,
    pub duration_minutes: i64,
    pub preferred_hours: HourRange,
}

impl Default for SlotRequest {
    fn default() -> Self {
        SlotRequest {
            required_attendees: vec![],
            optional_attendees: vec![],
            duration_minutes: 60,
            preferred_hours: HourRange::default(),
        }
    }
}

impl SlotRequest {
    /// Checks the request and returns the meeting length.
    fn validate(&self) -> Result<Duration> {
        // fields are public so the range may not have gone through `HourRange::new`
        HourRange::new(self.preferred_hours.start, self.preferred_hours.end)?;
        self.duration()
    }

    /// Meeting length, which must be positive and representable.
    pub fn duration(&self) -> Result<Duration> {
        let invalid = || ScheduleError::InvalidDuration {
            minutes: self.duration_minutes,
        };
        if self.duration_minutes <= 0 {
            return Err(invalid());
        }
        self.duration_minutes
            .checked_mul(60)
            .map(Duration::seconds)
            .ok_or_else(invalid)
    }

    fn attendees(&self) -> impl Iterator<Item = &str> {
        self.required_attendees
            .iter()
            .chain(&self.optional_attendees)
            .map(String::as_str)
    }

    fn attendee_count(&self) -> usize {
        self.required_attendees.len() + self.optional_attendees.len()
    }
}

/// A scored candidate meeting time.
#[derive(Debug, Clone, PartialEq, Eq, cli_table::Table)]
pub struct TimeSlot {
    #[table(title = "Start", display_fn = "display_start")]
    pub start: PrimitiveDateTime,
    #[table(title = "Score")]
    pub score: u32,
    #[table(title = "Conflicts")]
    pub conflict_count: usize,
    #[table(title = "Attendees free")]
    pub attendee_availability_count: usize,
    #[table(title = "Working hours")]
    pub within_working_hours: bool,
}

fn display_start(start: &PrimitiveDateTime) -> String {
    start
        .format(DATETIME_DESC)
        .unwrap_or_else(|_| start.to_string())
}

/// The best `max_suggestions` slots, highest score first.
///
/// Slots with equal scores stay in the order they were generated: by day, then by start
/// time.
pub fn find_candidate_slots(
    events: &[Event],
    calendars: &[Calendar],
    request: &SlotRequest,
    reference_now: PrimitiveDateTime,
    config: &SchedulerConfig,
) -> Result<Vec<TimeSlot>> {
    let mut slots = evaluate_candidates(events, calendars, request, reference_now, config)?;
    // `sort_by` is stable, which keeps ties in generation order
    slots.sort_by(|left, right| right.score.cmp(&left.score));
    slots.truncate(config.max_suggestions);
    tracing::debug!(
        "best slot scores: {:?}",
        slots.iter().map(|slot| slot.score).collect::<Vec<_>>()
    );
    Ok(slots)
}

/// Every candidate slot over the search horizon, in generation order.
///
/// Candidates start every `slot_granularity_minutes` inside the preferred hours of each day
/// from the day of `reference_now` onwards. The time of day of `reference_now` is not used.
pub fn evaluate_candidates(
    events: &[Event],
    calendars: &[Calendar],
    request: &SlotRequest,
    reference_now: PrimitiveDateTime,
    config: &SchedulerConfig,
) -> Result<Vec<TimeSlot>> {
    let duration = request.validate()?;
    let step = config.slot_granularity();
    let windows = working_windows(calendars);

    let first_day = reference_now.date();
    let horizon = i64::from(config.horizon_days);
    // one extra day on both sides for spans and slots crossing midnight
    let timeline = Timeline::build(
        events,
        first_day.checked_sub(Duration::DAY).unwrap_or(first_day),
        first_day
            .checked_add(Duration::days(horizon + 1))
            .unwrap_or(time::Date::MAX),
        config.default_event_duration(),
    );
    let attendee_count = request.attendee_count();

    let mut slots = vec![];
    for offset in 0..horizon {
        let Some(day) = first_day.checked_add(Duration::days(offset)) else {
            break;
        };
        let midnight = day.midnight();
        let (Some(mut start), Some(last)) = (
            midnight.checked_add(Duration::hours(request.preferred_hours.start.into())),
            midnight.checked_add(Duration::hours(request.preferred_hours.end.into())),
        ) else {
            break;
        };
        while start < last {
            let candidate = EventInterval::starting_at(start, duration).map_err(|_| {
                ScheduleError::InvalidDuration {
                    minutes: request.duration_minutes,
                }
            })?;
            let conflict_count = timeline.conflict_count(&candidate);
            let available = request
                .attendees()
                .filter(|attendee| timeline.is_free(attendee, &candidate))
                .count();
            let availability_ratio = if attendee_count == 0 {
                1.0
            } else {
                available as f64 / attendee_count as f64
            };
            let within_working_hours = complies_with_working_hours(&windows, &candidate);
            slots.push(TimeSlot {
                start,
                score: score(
                    conflict_count,
                    availability_ratio,
                    within_working_hours,
                    start.hour(),
                ),
                conflict_count,
                attendee_availability_count: available,
                within_working_hours,
            });
            let Some(next) = start.checked_add(step) else {
                break;
            };
            start = next;
        }
    }
    Ok(slots)
}

/// Parsed working hours of each calendar. Calendars whose working hours can't be parsed
/// are logged and left out, like malformed events.
fn working_windows(calendars: &[Calendar]) -> Vec<Option<WorkingWindow>> {
    calendars
        .iter()
        .filter_map(|calendar| match calendar.working_window() {
            Ok(window) => Some(window),
            Err(e) => {
                tracing::warn!("ignoring calendar `{}` for working hours: {e}", calendar.id);
                None
            }
        })
        .collect()
}

/// Whether some calendar accepts the slot. A calendar without working hours accepts any
/// slot, so with no calendars at all nothing is compliant.
fn complies_with_working_hours(windows: &[Option<WorkingWindow>], candidate: &EventInterval) -> bool {
    windows.iter().any(|window| match window {
        None => true,
        Some(window) => window.contains(candidate),
    })
}
