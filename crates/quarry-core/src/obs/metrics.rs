use serde::Serialize;
use std::cell::RefCell;

///
/// EventCounters
/// Ephemeral, per-thread counters for query-construction events.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventCounters {
    pub multiple_text_clauses: u64,
    pub and_escalations: u64,
    pub contradictions: u64,
}

thread_local! {
    static EVENT_COUNTERS: RefCell<EventCounters> = RefCell::new(EventCounters::default());
}

/// Borrow counters immutably.
pub(crate) fn with_counters<R>(f: impl FnOnce(&EventCounters) -> R) -> R {
    EVENT_COUNTERS.with(|c| f(&c.borrow()))
}

/// Borrow counters mutably.
pub(crate) fn with_counters_mut<R>(f: impl FnOnce(&mut EventCounters) -> R) -> R {
    EVENT_COUNTERS.with(|c| f(&mut c.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset() {
    with_counters_mut(|c| *c = EventCounters::default());
}
