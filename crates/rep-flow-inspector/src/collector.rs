//! Event collector for testing.
//!
//! `EventCollector` accumulates events for later inspection and assertion.

use parking_lot::Mutex;

use crate::events::{ExecutionTrace, FlowEvent};
use crate::sink::EventSink;

/// Event collector for testing - accumulates events for assertions.
///
/// # Example
///
/// ```ignore
/// use rep_flow::RepSelector;
/// use rep_flow_inspector::{EventCollector, EventSinkTracer};
/// use std::sync::Arc;
///
/// let collector = Arc::new(EventCollector::new());
/// let selector = RepSelector::with_tracer(reps, EventSinkTracer::new(collector.clone()));
/// selector.run(|rep| compile(rep))?;
///
/// let trace = collector.trace();
/// assert!(!trace.events.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Mutex<Vec<FlowEvent>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get collected events as an execution trace.
    pub fn trace(&self) -> ExecutionTrace {
        ExecutionTrace {
            events: self.events.lock().clone(),
        }
    }

    pub fn events(&self) -> Vec<FlowEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Take collected events, clearing the collector.
    pub fn take(&self) -> Vec<FlowEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for EventCollector {
    fn emit(&self, event: FlowEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AttemptId, RepKey};

    fn compiled(rep: &str) -> FlowEvent {
        FlowEvent::Compiled {
            attempt: AttemptId(1),
            rep: RepKey::new(rep),
        }
    }

    #[test]
    fn test_collector_basic() {
        let collector = EventCollector::new();
        assert!(collector.is_empty());

        collector.emit(compiled("a"));

        assert_eq!(collector.len(), 1);
        assert!(!collector.is_empty());
    }

    #[test]
    fn test_collector_clear() {
        let collector = EventCollector::new();
        collector.emit(compiled("a"));
        collector.clear();
        assert!(collector.is_empty());
    }

    #[test]
    fn test_collector_take() {
        let collector = EventCollector::new();
        collector.emit(compiled("a"));
        collector.emit(compiled("b"));

        let events = collector.take();
        assert_eq!(events, vec![compiled("a"), compiled("b")]);
        assert!(collector.is_empty());
    }
}
