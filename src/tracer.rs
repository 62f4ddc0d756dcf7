//! Tracer trait for observing scheduling.
//!
//! Every hook has an empty default implementation, so a tracer only overrides
//! the events it cares about. [`NoopTracer`] is the default and costs nothing;
//! [`TracingTracer`] forwards events to the `tracing` crate. The
//! `rep-flow-inspector` crate provides a tracer that records events for tests
//! and diagnostics.
//!
//! # Example
//!
//! ```ignore
//! use rep_flow::{AttemptId, RepSelector, Tracer};
//!
//! struct PrintTracer;
//!
//! impl<R: std::fmt::Display> Tracer<R> for PrintTracer {
//!     fn on_attempt(&self, attempt: AttemptId, rep: &R) {
//!         println!("#{} {}", attempt.0, rep);
//!     }
//! }
//!
//! let selector = RepSelector::with_tracer(reps, PrintTracer);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::cycle::DependencyCycle;
use crate::rep::Rep;
use crate::signal::UnmetDependency;

/// 1-based sequence number of an attempt within one selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttemptId(pub u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Observer of selector and compiler events.
pub trait Tracer<R> {
    /// A rep is handed out for an attempt.
    #[inline]
    fn on_attempt(&self, _attempt: AttemptId, _rep: &R) {}

    /// The attempt of `rep` signalled that `dependency` is not ready.
    #[inline]
    fn on_unmet_dependency(
        &self,
        _attempt: AttemptId,
        _rep: &R,
        _dependency: &UnmetDependency<R>,
    ) {
    }

    /// The attempt of `rep` succeeded; `rep` is done for this run.
    #[inline]
    fn on_compiled(&self, _attempt: AttemptId, _rep: &R) {}

    /// The active chain closed on itself.
    #[inline]
    fn on_cycle_detected(&self, _cycle: &DependencyCycle<R>) {}

    /// The compiler touched an up-to-date rep without compiling it.
    #[inline]
    fn on_skipped(&self, _rep: &R) {}

    /// A compiler run starts with `outdated` of `total` reps to compile.
    #[inline]
    fn on_run_start(&self, _total: usize, _outdated: usize) {}

    /// A compiler run finished, successfully or not.
    #[inline]
    fn on_run_end(&self, _succeeded: bool) {}
}

/// Tracer that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl<R> Tracer<R> for NoopTracer {}

impl<R, T: Tracer<R> + ?Sized> Tracer<R> for &T {
    fn on_attempt(&self, attempt: AttemptId, rep: &R) {
        (**self).on_attempt(attempt, rep)
    }

    fn on_unmet_dependency(&self, attempt: AttemptId, rep: &R, dependency: &UnmetDependency<R>) {
        (**self).on_unmet_dependency(attempt, rep, dependency)
    }

    fn on_compiled(&self, attempt: AttemptId, rep: &R) {
        (**self).on_compiled(attempt, rep)
    }

    fn on_cycle_detected(&self, cycle: &DependencyCycle<R>) {
        (**self).on_cycle_detected(cycle)
    }

    fn on_skipped(&self, rep: &R) {
        (**self).on_skipped(rep)
    }

    fn on_run_start(&self, total: usize, outdated: usize) {
        (**self).on_run_start(total, outdated)
    }

    fn on_run_end(&self, succeeded: bool) {
        (**self).on_run_end(succeeded)
    }
}

impl<R, T: Tracer<R> + ?Sized> Tracer<R> for Arc<T> {
    fn on_attempt(&self, attempt: AttemptId, rep: &R) {
        (**self).on_attempt(attempt, rep)
    }

    fn on_unmet_dependency(&self, attempt: AttemptId, rep: &R, dependency: &UnmetDependency<R>) {
        (**self).on_unmet_dependency(attempt, rep, dependency)
    }

    fn on_compiled(&self, attempt: AttemptId, rep: &R) {
        (**self).on_compiled(attempt, rep)
    }

    fn on_cycle_detected(&self, cycle: &DependencyCycle<R>) {
        (**self).on_cycle_detected(cycle)
    }

    fn on_skipped(&self, rep: &R) {
        (**self).on_skipped(rep)
    }

    fn on_run_start(&self, total: usize, outdated: usize) {
        (**self).on_run_start(total, outdated)
    }

    fn on_run_end(&self, succeeded: bool) {
        (**self).on_run_end(succeeded)
    }
}

/// Tracer that emits `tracing` events under the `rep_flow` target.
///
/// Attempts and completions are `TRACE`, unmet dependencies and skips are
/// `DEBUG`, cycles are `WARN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTracer;

impl<R: Rep> Tracer<R> for TracingTracer {
    fn on_attempt(&self, attempt: AttemptId, rep: &R) {
        tracing::trace!(target: "rep_flow", attempt = attempt.0, rep = %rep, "attempting");
    }

    fn on_unmet_dependency(&self, attempt: AttemptId, rep: &R, dependency: &UnmetDependency<R>) {
        tracing::debug!(
            target: "rep_flow",
            attempt = attempt.0,
            rep = %rep,
            dependency = %dependency.rep,
            need = %dependency.need,
            "suspended on unmet dependency"
        );
    }

    fn on_compiled(&self, attempt: AttemptId, rep: &R) {
        tracing::trace!(target: "rep_flow", attempt = attempt.0, rep = %rep, "compiled");
    }

    fn on_cycle_detected(&self, cycle: &DependencyCycle<R>) {
        tracing::warn!(target: "rep_flow", length = cycle.len(), "{}", cycle);
    }

    fn on_skipped(&self, rep: &R) {
        tracing::debug!(target: "rep_flow", rep = %rep, "up to date");
    }

    fn on_run_start(&self, total: usize, outdated: usize) {
        tracing::debug!(target: "rep_flow", total, outdated, "compilation started");
    }

    fn on_run_end(&self, succeeded: bool) {
        tracing::debug!(target: "rep_flow", succeeded, "compilation finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingTracer {
        attempts: Cell<usize>,
        compiled: Cell<usize>,
    }

    impl<R> Tracer<R> for CountingTracer {
        fn on_attempt(&self, _attempt: AttemptId, _rep: &R) {
            self.attempts.set(self.attempts.get() + 1);
        }

        fn on_compiled(&self, _attempt: AttemptId, _rep: &R) {
            self.compiled.set(self.compiled.get() + 1);
        }
    }

    #[test]
    fn test_counting_tracer_through_ref() {
        let tracer = CountingTracer::default();
        let by_ref = &tracer;

        by_ref.on_attempt(AttemptId(1), &"a");
        by_ref.on_attempt(AttemptId(2), &"a");
        Tracer::<&str>::on_compiled(&by_ref, AttemptId(2), &"a");

        assert_eq!(tracer.attempts.get(), 2);
        assert_eq!(tracer.compiled.get(), 1);
    }

    #[test]
    fn test_counting_tracer_through_arc() {
        let tracer = Arc::new(CountingTracer::default());
        tracer.on_attempt(AttemptId(1), &"a");
        Tracer::<&str>::on_skipped(&tracer, &"b");
        assert_eq!(tracer.attempts.get(), 1);
        assert_eq!(tracer.compiled.get(), 0);
    }

    #[test]
    fn test_attempt_id_display() {
        assert_eq!(AttemptId(3).to_string(), "#3");
    }
}
