//! EventSinkTracer - Bridge between the rep-flow `Tracer` and `EventSink`.

use std::sync::Arc;

use rep_flow::{AttemptId, DependencyCycle, Rep, Tracer, UnmetDependency};

use crate::events::{FlowEvent, RepKey};
use crate::sink::EventSink;

/// A `Tracer` implementation that forwards events to an `EventSink`.
///
/// The sink is flushed when a compiler run ends.
///
/// # Example
///
/// ```ignore
/// use rep_flow::Compiler;
/// use rep_flow_inspector::{EventCollector, EventSinkTracer};
/// use std::sync::Arc;
///
/// let collector = Arc::new(EventCollector::new());
/// let mut compiler = Compiler::builder(site)
///     .tracer(EventSinkTracer::new(collector.clone()))
///     .build();
///
/// compiler.run(Scope::All, false, &mut |_: &ItemRep, _: bool| {})?;
/// let trace = collector.trace();
/// ```
#[derive(Clone)]
pub struct EventSinkTracer {
    sink: Arc<dyn EventSink>,
}

impl EventSinkTracer {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }
}

impl<R: Rep> Tracer<R> for EventSinkTracer {
    #[inline]
    fn on_attempt(&self, attempt: AttemptId, rep: &R) {
        self.sink.emit(FlowEvent::Attempt {
            attempt,
            rep: RepKey::of(rep),
        });
    }

    #[inline]
    fn on_unmet_dependency(&self, attempt: AttemptId, rep: &R, dependency: &UnmetDependency<R>) {
        self.sink.emit(FlowEvent::UnmetDependency {
            attempt,
            rep: RepKey::of(rep),
            dependency: RepKey::of(&dependency.rep),
            need: dependency.need,
        });
    }

    #[inline]
    fn on_compiled(&self, attempt: AttemptId, rep: &R) {
        self.sink.emit(FlowEvent::Compiled {
            attempt,
            rep: RepKey::of(rep),
        });
    }

    #[inline]
    fn on_cycle_detected(&self, cycle: &DependencyCycle<R>) {
        self.sink.emit(FlowEvent::cycle(cycle));
    }

    #[inline]
    fn on_skipped(&self, rep: &R) {
        self.sink.emit(FlowEvent::Skipped {
            rep: RepKey::of(rep),
        });
    }

    #[inline]
    fn on_run_start(&self, total: usize, outdated: usize) {
        self.sink.emit(FlowEvent::RunStart { total, outdated });
    }

    #[inline]
    fn on_run_end(&self, succeeded: bool) {
        self.sink.emit(FlowEvent::RunEnd { succeeded });
        self.sink.flush();
    }
}
