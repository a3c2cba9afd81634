//! The scheduling assistant: recurrence expansion, slot search and drag rescheduling.
//!
//! Everything here is synchronous and works only on its arguments. The current time is
//! always passed in by the caller, so identical inputs give identical results.

pub mod conflict;
pub mod recurrence;
pub mod reschedule;
pub mod score;
pub mod slots;

pub use conflict::{Timeline, has_conflict};
pub use recurrence::{agenda, expand_occurrences, occurrences_between};
pub use reschedule::{DropTarget, apply_reschedule, reschedule_occurrence};
pub use score::score;
pub use slots::{HourRange, SlotRequest, TimeSlot, evaluate_candidates, find_candidate_slots};
