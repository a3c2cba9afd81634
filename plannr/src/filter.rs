//! Narrowing down which events a calendar view shows.

use crate::data::{Calendar, Event, EventKind};

const EVENT_KINDS: [EventKind; 4] = [
    EventKind::Work,
    EventKind::Personal,
    EventKind::Family,
    EventKind::Holiday,
];

/// Search text, tag selection and hidden calendars of a view.
///
/// The default filter lets every event through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Case-insensitive text looked up in the title and description.
    pub query: Option<String>,
    /// Events carrying any of these tags pass. Empty means no tag restriction.
    pub tags: Vec<String>,
    pub hidden_kinds: Vec<EventKind>,
}

impl EventFilter {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
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

    /// Hide the kinds of event whose calendar is switched off.
    ///
    /// Each kind is governed by the first calendar of the matching type. Kinds without such
    /// a calendar stay visible.
    pub fn hiding_invisible_calendars(mut self, calendars: &[Calendar]) -> Self {
        for kind in EVENT_KINDS {
            let governing = calendars
                .iter()
                .find(|calendar| calendar.kind.and_then(|k| k.event_kind()) == Some(kind));
            if governing.is_some_and(|calendar| !calendar.is_visible)
                && !self.hidden_kinds.contains(&kind)
            {
                self.hidden_kinds.push(kind);
            }
        }
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.matches_query(event)
            && !self.hidden_kinds.contains(&event.kind)
            && (self.tags.is_empty() || event.tags.iter().any(|tag| self.tags.contains(tag)))
    }

    fn matches_query(&self, event: &Event) -> bool {
        let Some(query) = &self.query else {
            return true;
        };
        let query = query.to_lowercase();
        event.title.to_lowercase().contains(&query)
            || event
                .description
                .as_ref()
                .is_some_and(|description| description.to_lowercase().contains(&query))
    }

    /// The events passing the filter, in store order.
    pub fn apply<'a>(&'a self, events: &'a [Event]) -> impl Iterator<Item = &'a Event> + 'a {
        events.iter().filter(move |event| self.matches(event))
    }
}
