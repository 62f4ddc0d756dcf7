//! Event sink trait and implementations.
//!
//! The `EventSink` trait defines the interface for receiving flow events.
//! Implementations can collect events for testing, write them out for later
//! analysis, or drop them.

use std::sync::Arc;

use crate::events::FlowEvent;

/// Trait for receiving flow events.
///
/// # Example
///
/// ```ignore
/// use rep_flow_inspector::{EventSink, FlowEvent};
///
/// struct PrintSink;
///
/// impl EventSink for PrintSink {
///     fn emit(&self, event: FlowEvent) {
///         println!("{:?}", event);
///     }
/// }
/// ```
pub trait EventSink: Send + Sync + 'static {
    /// Called when an event occurs.
    fn emit(&self, event: FlowEvent);

    /// Called at the end of a compiler run to flush buffered events.
    ///
    /// The default implementation does nothing.
    fn flush(&self) {}
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: FlowEvent) {
        (**self).emit(event)
    }

    fn flush(&self) {
        (**self).flush()
    }
}

/// Null sink that discards all events.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: FlowEvent) {}
}

/// A sink that forwards events to multiple child sinks.
pub struct MultiplexSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl MultiplexSink {
    pub fn new(sinks: Vec<Box<dyn EventSink>>) -> Self {
        Self { sinks }
    }
}

impl EventSink for MultiplexSink {
    fn emit(&self, event: FlowEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }

    fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }
}

/// A sink that filters events before forwarding.
pub struct FilterSink<F, S>
where
    F: Fn(&FlowEvent) -> bool + Send + Sync + 'static,
    S: EventSink,
{
    filter: F,
    inner: S,
}

impl<F, S> FilterSink<F, S>
where
    F: Fn(&FlowEvent) -> bool + Send + Sync + 'static,
    S: EventSink,
{
    pub fn new(filter: F, inner: S) -> Self {
        Self { filter, inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<F, S> EventSink for FilterSink<F, S>
where
    F: Fn(&FlowEvent) -> bool + Send + Sync + 'static,
    S: EventSink,
{
    fn emit(&self, event: FlowEvent) {
        if (self.filter)(&event) {
            self.inner.emit(event);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}
