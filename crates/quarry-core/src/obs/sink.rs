//! Event sink boundary.
//!
//! Builder logic MUST NOT touch `obs::metrics` or `tracing` directly.
//! All instrumentation flows through `QueryEvent` and `EventSink`.
use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn EventSink>>> = RefCell::new(None);
}

///
/// QueryEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QueryEvent {
    /// A second `$text` clause was merged into a selector that already had
    /// one. The server rejects such queries.
    MultipleTextClauses,

    /// A field condition collided with an existing one and both were moved
    /// under `$and`.
    AndEscalation { field: String },

    /// A finished selector was found to be unsatisfiable.
    ContradictionDetected,
}

///
/// EventSink
///

pub trait EventSink {
    fn record(&self, event: &QueryEvent);
}

///
/// GlobalEventSink
/// Default sink: bumps thread-local counters and logs through `tracing`.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalEventSink;

impl EventSink for GlobalEventSink {
    fn record(&self, event: &QueryEvent) {
        match event {
            QueryEvent::MultipleTextClauses => {
                metrics::with_counters_mut(|c| {
                    c.multiple_text_clauses = c.multiple_text_clauses.saturating_add(1);
                });
                tracing::warn!(
                    target: "quarry::query",
                    "multiple $text expressions per query are not supported by the server"
                );
            }
            QueryEvent::AndEscalation { field } => {
                metrics::with_counters_mut(|c| {
                    c.and_escalations = c.and_escalations.saturating_add(1);
                });
                tracing::debug!(target: "quarry::query", field = %field, "condition escalated to $and");
            }
            QueryEvent::ContradictionDetected => {
                metrics::with_counters_mut(|c| {
                    c.contradictions = c.contradictions.saturating_add(1);
                });
                tracing::debug!(target: "quarry::query", "selector can never match");
            }
        }
    }
}

pub(crate) fn record(event: &QueryEvent) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match override_sink {
        Some(sink) => sink.record(event),
        None => GlobalEventSink.record(event),
    }
}

/// Snapshot the current thread's event counters.
#[must_use]
pub fn event_counters() -> metrics::EventCounters {
    metrics::with_counters(|c| *c)
}

/// Reset the current thread's event counters.
pub fn reset_event_counters() {
    metrics::reset();
}

/// Run a closure with a temporary sink override on the current thread.
pub fn with_event_sink<T>(sink: Rc<dyn EventSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn EventSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let previous = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = previous;
            });
        }
    }

    let previous = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(previous);

    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        events: RefCell<Vec<QueryEvent>>,
    }

    impl EventSink for RecordingSink {
        fn record(&self, event: &QueryEvent) {
            self.events.borrow_mut().push(event.clone());
        }
    }

    #[test]
    fn override_sink_receives_events_and_is_restored() {
        reset_event_counters();
        let sink = Rc::new(RecordingSink::default());

        with_event_sink(sink.clone(), || record(&QueryEvent::ContradictionDetected));
        assert_eq!(
            sink.events.borrow().as_slice(),
            &[QueryEvent::ContradictionDetected]
        );
        assert_eq!(event_counters().contradictions, 0);

        record(&QueryEvent::ContradictionDetected);
        assert_eq!(sink.events.borrow().len(), 1);
        assert_eq!(event_counters().contradictions, 1);
    }

    #[test]
    fn global_sink_counts_per_event_kind() {
        reset_event_counters();

        record(&QueryEvent::MultipleTextClauses);
        record(&QueryEvent::AndEscalation {
            field: "name".to_string(),
        });
        record(&QueryEvent::AndEscalation {
            field: "age".to_string(),
        });

        let counters = event_counters();
        assert_eq!(counters.multiple_text_clauses, 1);
        assert_eq!(counters.and_escalations, 2);
        assert_eq!(counters.contradictions, 0);
    }
}
