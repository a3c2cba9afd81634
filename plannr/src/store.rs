//! In-memory event store owned by the calendar UI for the length of a session.

use std::collections::BTreeMap;

use time::{Date, PrimitiveDateTime};

use crate::{
    config::SchedulerConfig,
    data::{Calendar, Event, Occurrence},
    error::{Result, ScheduleError},
    filter::EventFilter,
    schedule::{self, DropTarget, SlotRequest, TimeSlot},
};

/// Source of ids for newly created events.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Ids made of a prefix and an increasing counter: `evt1`, `evt2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        SequentialIds {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("evt")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Events in insertion order.
#[derive(Debug, Clone, Default)]
pub struct EventStore<G = SequentialIds> {
    events: Vec<Event>,
    ids: G,
}

impl EventStore<SequentialIds> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: IdGenerator> EventStore<G> {
    pub fn with_id_generator(ids: G) -> Self {
        EventStore { events: vec![], ids }
    }

    /// Store built from existing records, which must have distinct ids.
    pub fn from_events(events: Vec<Event>, ids: G) -> Result<Self> {
        let mut store = Self::with_id_generator(ids);
        for event in events {
            store.add(event)?;
        }
        Ok(store)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Store `event` under a freshly generated id, replacing whatever id it had.
    pub fn insert(&mut self, mut event: Event) -> &Event {
        event.id = loop {
            let id = self.ids.next_id();
            if self.get(&id).is_none() {
                break id;
            }
        };
        tracing::debug!("created event `{}`", event.id);
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    /// Store `event` under its own id.
    pub fn add(&mut self, event: Event) -> Result<()> {
        if self.get(&event.id).is_some() {
            return Err(ScheduleError::DuplicateEvent(event.id));
        }
        self.events.push(event);
        Ok(())
    }

    /// Replace the stored event with the same id.
    pub fn update(&mut self, event: Event) -> Result<()> {
        let Some(slot) = self.events.iter_mut().find(|stored| stored.id == event.id) else {
            return Err(ScheduleError::EventNotFound(event.id));
        };
        *slot = event;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Event> {
        let Some(index) = self.events.iter().position(|event| event.id == id) else {
            return Err(ScheduleError::EventNotFound(id.to_string()));
        };
        Ok(self.events.remove(index))
    }

    /// Occurrences of the events passing `filter`, see [`schedule::occurrences_between`].
    pub fn occurrences_between(
        &self,
        filter: &EventFilter,
        window_start: Date,
        window_end: Date,
    ) -> Vec<Occurrence> {
        schedule::occurrences_between(filter.apply(&self.events), window_start, window_end)
    }

    /// Agenda of the events passing `filter`, see [`schedule::agenda`].
    pub fn agenda(
        &self,
        filter: &EventFilter,
        window_start: Date,
        window_end: Date,
    ) -> BTreeMap<Date, Vec<Occurrence>> {
        schedule::agenda(filter.apply(&self.events), window_start, window_end)
    }

    /// See [`schedule::find_candidate_slots`].
    pub fn suggest_slots(
        &self,
        calendars: &[Calendar],
        request: &SlotRequest,
        reference_now: PrimitiveDateTime,
        config: &SchedulerConfig,
    ) -> Result<Vec<TimeSlot>> {
        schedule::find_candidate_slots(&self.events, calendars, request, reference_now, config)
    }

    /// Apply a drop of `occurrence_id` onto `target`, see [`schedule::apply_reschedule`].
    pub fn reschedule(&mut self, occurrence_id: &str, target: impl Into<DropTarget>) -> Result<bool> {
        schedule::apply_reschedule(&mut self.events, occurrence_id, target.into())
    }
}
