use thiserror::Error;

use crate::data::EventIntervalError;

pub type Result<T, E = ScheduleError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("event `{event_id}` has invalid date `{value}`")]
    InvalidDate {
        event_id: String,
        value: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("event `{event_id}` has invalid time `{value}`")]
    InvalidTime {
        event_id: String,
        value: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("event `{event_id}` has an invalid interval")]
    EventInterval {
        event_id: String,
        #[source]
        source: EventIntervalError,
    },
    #[error(transparent)]
    Interval(#[from] EventIntervalError),
    #[error("calendar `{calendar_id}` has invalid working hours bound `{value}`")]
    InvalidWorkingHours {
        calendar_id: String,
        value: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("meeting duration must be positive, got {minutes} minutes")]
    InvalidDuration { minutes: i64 },
    #[error("preferred hour range {start}..{end} is empty or past midnight")]
    InvalidHourRange { start: u8, end: u8 },
    #[error("moving event `{event_id}` leaves the supported date range")]
    DateOutOfRange { event_id: String },
    #[error("an event with id `{0}` already exists")]
    DuplicateEvent(String),
    #[error("no event with id `{0}`")]
    EventNotFound(String),
}
