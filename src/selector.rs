//! Dependency-driven rep selection.
//!
//! [`RepSelector`] decides which rep to attempt next. Dependencies between
//! reps are not known up front: an attempt discovers them by touching another
//! rep's output and reporting an [`UnmetDependency`]. The selector then moves
//! the needed rep to the front of its queue and retries the suspended rep once
//! the dependency is done.
//!
//! Suspended reps form the *active chain* ("a waits on b waits on c"). A
//! signal naming a rep that is already on the chain is a cycle, reported as a
//! [`DependencyCycle`].

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use crate::cycle::{CycleEntry, DependencyCycle};
use crate::error::{AttemptError, SelectError};
use crate::rep::Rep;
use crate::signal::{NeedKind, UnmetDependency};
use crate::tracer::{AttemptId, NoopTracer, Tracer};

/// Cooperative scheduler over a set of reps.
///
/// Two ways to drive it:
///
/// - [`run`](Self::run) takes the attempt as a closure and loops until every
///   rep is done or something fails.
/// - [`next_attempt`](Self::next_attempt) / [`report`](Self::report) hand the
///   loop to the caller, one attempt at a time.
///
/// # Example
///
/// ```ignore
/// let mut selector = RepSelector::new(site.reps());
/// while let Some(rep) = selector.next_attempt() {
///     match compile(&rep) {
///         Ok(()) => selector.report(Ok(()))?,
///         Err(AttemptError::Unmet(dependency)) => selector.report(Err(dependency))?,
///         Err(AttemptError::Failed(e)) => return Err(e.context(format!("compiling {rep}"))),
///     }
/// }
/// ```
///
/// A selector is single-use: once every rep is done, or a cycle has been
/// found, `next_attempt` returns `None`.
pub struct RepSelector<R: Rep, T: Tracer<R> = NoopTracer> {
    /// Reps not yet compiled. Each rep appears at most once.
    pending: VecDeque<R>,
    /// Suspended reps in the order they were first attempted, with the need
    /// each one last signalled.
    chain: IndexMap<R, Option<NeedKind>, ahash::RandomState>,
    /// Rep handed out by `next_attempt` and not yet reported.
    in_flight: Option<R>,
    attempts: u64,
    tracer: T,
}

impl<R: Rep> RepSelector<R> {
    /// Create a selector over `reps`, attempted in the given order.
    ///
    /// Duplicates are dropped; the first occurrence keeps its position.
    pub fn new(reps: impl IntoIterator<Item = R>) -> Self {
        Self::with_tracer(reps, NoopTracer)
    }
}

impl<R: Rep, T: Tracer<R>> RepSelector<R, T> {
    /// Create a selector that reports its events to `tracer`.
    pub fn with_tracer(reps: impl IntoIterator<Item = R>, tracer: T) -> Self {
        let mut seen = HashSet::with_hasher(ahash::RandomState::new());
        let pending = reps
            .into_iter()
            .filter(|rep| seen.insert(rep.clone()))
            .collect();

        Self {
            pending,
            chain: IndexMap::with_hasher(ahash::RandomState::new()),
            in_flight: None,
            attempts: 0,
            tracer,
        }
    }

    /// Hand out the next rep to attempt, or `None` when nothing is left.
    ///
    /// An attempt that was handed out and never reported counts as a success,
    /// the same as `report(Ok(()))`.
    pub fn next_attempt(&mut self) -> Option<R> {
        if let Some(rep) = self.in_flight.take() {
            self.succeed(rep);
        }

        let rep = self.pending.front()?.clone();
        if !self.chain.contains_key(&rep) {
            self.chain.insert(rep.clone(), None);
        }

        self.attempts += 1;
        self.tracer.on_attempt(AttemptId(self.attempts), &rep);
        self.in_flight = Some(rep.clone());
        Some(rep)
    }

    /// Report the outcome of the attempt handed out last.
    ///
    /// `Ok(())` marks the rep done. `Err(dependency)` suspends it until the
    /// dependency is done; the dependency becomes the next attempt. If the
    /// dependency is itself suspended, the chain is a cycle: the selector is
    /// emptied and the cycle is returned.
    ///
    /// Reporting with no attempt in flight does nothing.
    pub fn report(
        &mut self,
        outcome: Result<(), UnmetDependency<R>>,
    ) -> Result<(), DependencyCycle<R>> {
        let Some(rep) = self.in_flight.take() else {
            return Ok(());
        };

        match outcome {
            Ok(()) => {
                self.succeed(rep);
                Ok(())
            }
            Err(dependency) => self.suspend(rep, dependency),
        }
    }

    /// Attempt every rep until all are done.
    ///
    /// `attempt` is called once per attempt, possibly several times for the
    /// same rep. `AttemptError::Unmet` reschedules; `AttemptError::Failed`
    /// stops immediately and is returned unchanged as
    /// [`SelectError::Attempt`].
    pub fn run<F>(mut self, mut attempt: F) -> Result<(), SelectError<R>>
    where
        F: FnMut(&R) -> Result<(), AttemptError<R>>,
    {
        while let Some(rep) = self.next_attempt() {
            match attempt(&rep) {
                Ok(()) => self.report(Ok(()))?,
                Err(AttemptError::Unmet(dependency)) => self.report(Err(dependency))?,
                Err(AttemptError::Failed(e)) => return Err(SelectError::Attempt(e)),
            }
        }
        Ok(())
    }

    /// Reps not compiled yet, in the order they will be attempted.
    pub fn pending(&self) -> impl Iterator<Item = &R> {
        self.pending.iter()
    }

    /// Suspended reps, outermost first.
    pub fn active_chain(&self) -> impl Iterator<Item = &R> {
        self.chain.keys()
    }

    /// Number of attempts handed out so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// `true` once nothing is left to attempt.
    pub fn is_done(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_none()
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    fn succeed(&mut self, rep: R) {
        if let Some(pos) = self.pending.iter().position(|r| r == &rep) {
            self.pending.remove(pos);
        }
        self.chain.shift_remove(&rep);
        self.tracer.on_compiled(AttemptId(self.attempts), &rep);
    }

    fn suspend(
        &mut self,
        rep: R,
        dependency: UnmetDependency<R>,
    ) -> Result<(), DependencyCycle<R>> {
        self.tracer
            .on_unmet_dependency(AttemptId(self.attempts), &rep, &dependency);

        if let Some(need) = self.chain.get_mut(&rep) {
            *need = Some(dependency.need);
        }

        if let Some(start) = self.chain.get_index_of(&dependency.rep) {
            let cycle = self.cycle_from(start);
            self.tracer.on_cycle_detected(&cycle);
            self.pending.clear();
            self.chain.clear();
            return Err(cycle);
        }

        if let Some(pos) = self.pending.iter().position(|r| r == &dependency.rep) {
            self.pending.remove(pos);
        }
        self.pending.push_front(dependency.rep);
        Ok(())
    }

    fn cycle_from(&self, start: usize) -> DependencyCycle<R> {
        let entries = self
            .chain
            .iter()
            .skip(start)
            // Every chain entry from `start` on has signalled the entry after it.
            .map(|(rep, need)| CycleEntry {
                rep: rep.clone(),
                need: need.unwrap_or_default(),
            })
            .collect();
        DependencyCycle::new(entries)
    }
}
