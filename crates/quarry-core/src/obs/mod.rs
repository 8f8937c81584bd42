//! Observability: builder-side event counters and the sink boundary.
//!
//! Query construction never logs or counts directly; it records a
//! `QueryEvent` and the active sink decides what to do with it.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::EventCounters;
pub use sink::{
    EventSink, GlobalEventSink, QueryEvent, event_counters, reset_event_counters,
    with_event_sink,
};
