use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{
    Date, Duration, PrimitiveDateTime, Time, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::error::{Result, ScheduleError};

mod interval;
pub use interval::{EventInterval, EventIntervalError};

pub const DATE_DESC: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
pub const TIME_DESC: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]");
pub const DATETIME_DESC: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// How often an event repeats.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::Yearly => "yearly",
        })
    }
}

/// Display classification, the scheduler never looks at it.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Work,
    #[default]
    Personal,
    Family,
    Holiday,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

/// An event record as the calendar UI stores it.
///
/// Dates and times are kept as the `YYYY-MM-DD` / `HH:MM` strings entered by the user and
/// parsed when the scheduler needs them, so a single malformed record only fails the
/// operations that touch it. Fields the scheduler has no use for (reminders, colour,
/// attachments, sharing, ...) are carried in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub date: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<String>,
    #[serde(rename = "type", default)]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    pub fn new(id: impl Into<String>, title: impl Into<String>, start: PrimitiveDateTime) -> Self {
        Event {
            id: id.into(),
            title: title.into(),
            date: format_date(start.date()),
            time: format_time(start.time()),
            end_date: None,
            end_time: None,
            recurrence: Recurrence::None,
            attendees: vec![],
            kind: EventKind::default(),
            description: None,
            location: None,
            status: None,
            tags: vec![],
            extra: Map::new(),
        }
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_end_time(mut self, end_time: Time) -> Self {
        self.end_time = Some(format_time(end_time));
        self
    }

    pub fn with_end_date(mut self, end_date: Date) -> Self {
        self.end_date = Some(format_date(end_date));
        self
    }

    pub fn with_attendees<I, S>(mut self, attendees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attendees = attendees.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence != Recurrence::None
    }

    /// Events with an end date are a single span and are never expanded.
    pub fn is_multi_day(&self) -> bool {
        self.end_date.is_some()
    }

    pub fn has_attendee(&self, attendee: &str) -> bool {
        self.attendees.iter().any(|a| a == attendee)
    }

    pub fn anchor_date(&self) -> Result<Date> {
        parse_date(&self.id, &self.date)
    }

    pub fn anchor_time(&self) -> Result<Time> {
        parse_time(&self.id, &self.time)
    }

    pub fn parsed_end_date(&self) -> Result<Option<Date>> {
        self.end_date
            .as_deref()
            .map(|value| parse_date(&self.id, value))
            .transpose()
    }

    pub fn parsed_end_time(&self) -> Result<Option<Time>> {
        self.end_time
            .as_deref()
            .map(|value| parse_time(&self.id, value))
            .transpose()
    }
}

/// A single dated instance of an [`Event`], only alive for the duration of a query.
#[derive(Debug, Clone, PartialEq, Eq, cli_table::Table)]
pub struct Occurrence {
    #[table(title = "Occurrence")]
    pub id: String,
    #[table(title = "Event")]
    pub event_id: String,
    #[table(title = "Title")]
    pub title: String,
    #[table(title = "Date")]
    pub date: Date,
    #[table(title = "Time", display_fn = "display_time")]
    pub time: Time,
    #[table(skip)]
    pub end_date: Option<Date>,
    #[table(skip)]
    pub end_time: Option<Time>,
}

impl Occurrence {
    /// Occurrence of `event` on its own anchor date.
    pub fn at_anchor(event: &Event) -> Result<Self> {
        let date = event.anchor_date()?;
        Ok(Occurrence {
            id: occurrence_id(&event.id, date),
            event_id: event.id.clone(),
            title: event.title.clone(),
            date,
            time: event.anchor_time()?,
            end_date: event.parsed_end_date()?,
            end_time: event.parsed_end_time()?,
        })
    }

    /// The same occurrence moved to another date, keeping its time of day.
    pub fn on(&self, date: Date) -> Self {
        Occurrence {
            id: occurrence_id(&self.event_id, date),
            date,
            ..self.clone()
        }
    }

    pub fn start(&self) -> PrimitiveDateTime {
        self.date.with_time(self.time)
    }

    /// Time taken up by this occurrence.
    ///
    /// Without an explicit end time the occurrence is assumed to last `default_duration`.
    pub fn interval(&self, default_duration: Duration) -> Result<EventInterval> {
        let start = self.start();
        let interval = match self.end_time {
            Some(end_time) => {
                EventInterval::new(start, self.end_date.unwrap_or(self.date).with_time(end_time))
            }
            None => EventInterval::starting_at(start, default_duration),
        };
        interval.map_err(|source| ScheduleError::EventInterval {
            event_id: self.event_id.clone(),
            source,
        })
    }
}

/// Deterministic id of the occurrence of `event_id` on `date`.
pub fn occurrence_id(event_id: &str, date: Date) -> String {
    format!("{event_id}-{}", format_date(date))
}

/// Split an occurrence id into its event id and date.
///
/// Ids without a trailing `-YYYY-MM-DD` are returned whole, with no date.
pub fn split_occurrence_id(id: &str) -> (&str, Option<Date>) {
    const SUFFIX_LEN: usize = "-YYYY-MM-DD".len();
    let Some(split) = id.len().checked_sub(SUFFIX_LEN) else {
        return (id, None);
    };
    if split == 0 || !id.is_char_boundary(split) {
        return (id, None);
    }
    let (base, suffix) = id.split_at(split);
    match suffix
        .strip_prefix('-')
        .and_then(|date| Date::parse(date, DATE_DESC).ok())
    {
        Some(date) => (base, Some(date)),
        None => (id, None),
    }
}

/// What a calendar holds, matched against [`EventKind`] to decide which events it shows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarKind {
    Personal,
    Work,
    Shared,
    Holiday,
}

impl CalendarKind {
    /// The kind of event shown through a calendar of this kind, if any.
    pub fn event_kind(self) -> Option<EventKind> {
        match self {
            CalendarKind::Personal => Some(EventKind::Personal),
            CalendarKind::Work => Some(EventKind::Work),
            CalendarKind::Holiday => Some(EventKind::Holiday),
            CalendarKind::Shared => None,
        }
    }
}

/// A calendar the user can schedule into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "visible_by_default")]
    pub is_visible: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CalendarKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<CalendarSettings>,
    /// Colour, owner, sharing and whatever else the UI keeps on the record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn visible_by_default() -> bool {
    true
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<WorkingHours>,
    /// Accepted for completeness, times are always compared as naive local values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Calendar {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Calendar {
            id: id.into(),
            name: name.into(),
            is_visible: true,
            kind: None,
            settings: None,
            extra: Map::new(),
        }
    }

    pub fn with_kind(mut self, kind: CalendarKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_working_hours(mut self, working_hours: WorkingHours) -> Self {
        self.settings.get_or_insert_with(CalendarSettings::default).working_hours =
            Some(working_hours);
        self
    }

    pub fn working_hours(&self) -> Option<&WorkingHours> {
        self.settings.as_ref()?.working_hours.as_ref()
    }

    /// Parsed working hours, `None` when the calendar does not restrict scheduling.
    pub fn working_window(&self) -> Result<Option<WorkingWindow>> {
        let Some(hours) = self.working_hours() else {
            return Ok(None);
        };
        let parse = |value: &str| {
            Time::parse(value, TIME_DESC).map_err(|source| ScheduleError::InvalidWorkingHours {
                calendar_id: self.id.clone(),
                value: value.to_string(),
                source,
            })
        };
        Ok(Some(WorkingWindow {
            start: parse(&hours.start)?,
            end: parse(&hours.end)?,
            days: hours.days.clone(),
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    /// `HH:MM`
    pub start: String,
    /// `HH:MM`
    pub end: String,
    /// Active weekdays, `0` is Sunday.
    pub days: Vec<u8>,
}

/// Parsed form of [`WorkingHours`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingWindow {
    pub start: Time,
    pub end: Time,
    pub days: Vec<u8>,
}

impl WorkingWindow {
    /// Whether `slot` falls on an active weekday and inside the daily bounds.
    pub fn contains(&self, slot: &EventInterval) -> bool {
        let (start, end) = (slot.start(), slot.end());
        start.date() == end.date()
            && self
                .days
                .contains(&start.weekday().number_days_from_sunday())
            && start.time() >= self.start
            && end.time() <= self.end
    }
}

pub fn parse_date(event_id: &str, value: &str) -> Result<Date> {
    Date::parse(value, DATE_DESC).map_err(|source| ScheduleError::InvalidDate {
        event_id: event_id.to_string(),
        value: value.to_string(),
        source,
    })
}

pub fn parse_time(event_id: &str, value: &str) -> Result<Time> {
    Time::parse(value, TIME_DESC).map_err(|source| ScheduleError::InvalidTime {
        event_id: event_id.to_string(),
        value: value.to_string(),
        source,
    })
}

/// `YYYY-MM-DD`
pub fn format_date(date: Date) -> String {
    date.format(DATE_DESC).unwrap_or_else(|_| date.to_string())
}

/// `HH:MM`
pub fn format_time(time: Time) -> String {
    time.format(TIME_DESC).unwrap_or_else(|_| time.to_string())
}

fn display_time(time: &Time) -> String {
    format_time(*time)
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime, time};

    use super::{
        Calendar, CalendarKind, Event, EventInterval, EventKind, Occurrence, Recurrence,
        WorkingHours, format_date, format_time, split_occurrence_id,
    };
    use crate::ScheduleError;

    #[test]
    fn deserialize_ui_record() {
        let input = r#"{
            "id": "1",
            "title": "Team Meeting",
            "date": "2024-03-01",
            "time": "10:00",
            "endTime": "11:00",
            "type": "work",
            "recurrence": "weekly",
            "attendees": ["alice", "bob"],
            "status": "confirmed"
        }"#;
        let event: Event = serde_json::from_str(input).unwrap();
        assert_eq!(event.kind, EventKind::Work);
        assert_eq!(event.recurrence, Recurrence::Weekly);
        assert_eq!(event.end_time.as_deref(), Some("11:00"));
        assert!(event.has_attendee("bob"));
        assert!(!event.has_attendee("carol"));
        assert_eq!(event.anchor_date().unwrap(), date!(2024 - 03 - 01));
        assert_eq!(event.anchor_time().unwrap(), time!(10:00));
    }

    #[test]
    fn missing_recurrence_is_none() {
        let event: Event =
            serde_json::from_str(r#"{"id": "x", "date": "2024-03-01", "time": "09:30"}"#)
                .unwrap();
        assert_eq!(event.recurrence, Recurrence::None);
        assert!(!event.is_recurring());
    }

    #[test]
    fn malformed_anchor() {
        let mut event = Event::new("bad", "Bad", datetime!(2024-01-01 09:00));
        event.date = "2024-13-45".to_string();
        assert!(matches!(
            event.anchor_date(),
            Err(ScheduleError::InvalidDate { event_id, .. }) if event_id == "bad"
        ));
        event.time = "9am".to_string();
        assert!(matches!(
            event.anchor_time(),
            Err(ScheduleError::InvalidTime { .. })
        ));
    }

    #[test]
    fn occurrence_interval_defaults_duration() {
        let event = Event::new("a", "A", datetime!(2024-01-01 09:00));
        let occurrence = Occurrence::at_anchor(&event).unwrap();
        assert_eq!(occurrence.id, "a-2024-01-01");
        let interval = occurrence.interval(time::Duration::minutes(45)).unwrap();
        assert_eq!(interval.end(), datetime!(2024-01-01 09:45));

        let event = event.with_end_time(time!(08:00));
        let occurrence = Occurrence::at_anchor(&event).unwrap();
        assert!(matches!(
            occurrence.interval(time::Duration::minutes(45)),
            Err(ScheduleError::EventInterval { .. })
        ));
    }

    #[test]
    fn multi_day_interval_ends_on_end_date() {
        let event = Event::new("trip", "Trip", datetime!(2024-01-01 18:00))
            .with_end_date(date!(2024 - 01 - 03))
            .with_end_time(time!(12:00));
        let interval = Occurrence::at_anchor(&event)
            .unwrap()
            .interval(time::Duration::hours(1))
            .unwrap();
        assert_eq!(interval.end(), datetime!(2024-01-03 12:00));
    }

    #[test]
    fn split_ids() {
        assert_eq!(
            split_occurrence_id("E2-2024-03-15"),
            ("E2", Some(date!(2024 - 03 - 15)))
        );
        assert_eq!(
            split_occurrence_id("team-sync-2024-01-08"),
            ("team-sync", Some(date!(2024 - 01 - 08)))
        );
        assert_eq!(split_occurrence_id("E2"), ("E2", None));
        assert_eq!(split_occurrence_id("-2024-03-15"), ("-2024-03-15", None));
        assert_eq!(split_occurrence_id("abc-2024-99-15"), ("abc-2024-99-15", None));
    }

    #[test]
    fn working_window_contains() {
        let calendar = Calendar::new("work", "Work").with_working_hours(WorkingHours {
            start: "09:00".to_string(),
            end: "17:00".to_string(),
            days: vec![1, 2, 3, 4, 5],
        });
        let window = calendar.working_window().unwrap().unwrap();
        // 2024-01-01 is a Monday
        let inside = EventInterval::new(datetime!(2024-01-01 16:00), datetime!(2024-01-01 17:00))
            .unwrap();
        assert!(window.contains(&inside));
        let late = EventInterval::new(datetime!(2024-01-01 16:30), datetime!(2024-01-01 17:30))
            .unwrap();
        assert!(!window.contains(&late));
        let saturday =
            EventInterval::new(datetime!(2024-01-06 10:00), datetime!(2024-01-06 11:00))
                .unwrap();
        assert!(!window.contains(&saturday));
    }

    #[test]
    fn invalid_working_hours() {
        let calendar = Calendar::new("work", "Work").with_working_hours(WorkingHours {
            start: "nine".to_string(),
            end: "17:00".to_string(),
            days: vec![1],
        });
        assert!(matches!(
            calendar.working_window(),
            Err(ScheduleError::InvalidWorkingHours { .. })
        ));
        assert_eq!(Calendar::new("any", "Any").working_window().unwrap(), None);
    }

    #[test]
    fn calendar_settings_hold_working_hours() {
        let input = r#"{
            "id": "work",
            "name": "Work",
            "color": "blue",
            "isVisible": false,
            "type": "work",
            "owner": "alice",
            "settings": {
                "defaultView": "week",
                "workingHours": {"start": "08:30", "end": "16:30", "days": [1, 2, 3, 4, 5]},
                "timezone": "Europe/Paris"
            }
        }"#;
        let calendar: Calendar = serde_json::from_str(input).unwrap();
        assert!(!calendar.is_visible);
        assert_eq!(calendar.kind, Some(CalendarKind::Work));
        assert_eq!(calendar.kind.and_then(CalendarKind::event_kind), Some(EventKind::Work));
        let window = calendar.working_window().unwrap().unwrap();
        assert_eq!(window.start, time!(08:30));
        assert_eq!(window.end, time!(16:30));

        let written = serde_json::to_value(&calendar).unwrap();
        let read: serde_json::Value = serde_json::from_str(input).unwrap();
        assert_eq!(written, read);
    }

    #[test]
    fn bare_calendar_is_visible() {
        let calendar: Calendar = serde_json::from_str(r#"{"id": "c"}"#).unwrap();
        assert!(calendar.is_visible);
        assert_eq!(calendar.kind, None);
        assert_eq!(calendar.working_hours(), None);
    }

    #[test]
    fn unmodelled_event_fields_are_kept() {
        let input = r#"{
            "id": "1",
            "title": "Dentist",
            "date": "2024-03-01",
            "time": "10:00",
            "type": "personal",
            "recurrence": "none",
            "tags": ["health"],
            "color": "green",
            "priority": "high",
            "reminders": [{"type": "email", "time": 30}]
        }"#;
        let event: Event = serde_json::from_str(input).unwrap();
        assert_eq!(event.tags, ["health"]);
        assert_eq!(event.extra["priority"], "high");
        let written = serde_json::to_value(&event).unwrap();
        let read: serde_json::Value = serde_json::from_str(input).unwrap();
        assert_eq!(written, read);
    }

    #[test]
    fn formats_match_parse_descriptions() {
        assert_eq!(format_date(date!(2024 - 03 - 05)), "2024-03-05");
        assert_eq!(format_time(time!(07:05)), "07:05");
        assert_eq!(format_time(time!(23:59:59)), "23:59");
    }
}
