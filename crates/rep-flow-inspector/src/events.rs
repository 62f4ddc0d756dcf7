//! Event types for rep-flow tracing.
//!
//! Every selector and compiler hook of [`rep_flow::Tracer`] has a matching
//! [`FlowEvent`]. Reps are stored type-erased as their display text, so a
//! trace can be serialized and compared regardless of the rep type.

use std::fmt;

use serde::{Deserialize, Serialize};

pub use rep_flow::{AttemptId, NeedKind};

use rep_flow::{DependencyCycle, Rep};

/// A rep in a type-erased manner: its display text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepKey(pub String);

impl RepKey {
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    pub fn of<R: Rep>(rep: &R) -> Self {
        Self(rep.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RepKey {
    fn from(description: &str) -> Self {
        Self::new(description)
    }
}

/// One entry of a recorded cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStep {
    pub rep: RepKey,
    /// What `rep` needs from the next step.
    pub need: NeedKind,
}

/// Events emitted while selecting and compiling reps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowEvent {
    // === Compiler Run ===
    /// A compiler run started.
    RunStart { total: usize, outdated: usize },

    /// A compiler run finished.
    RunEnd { succeeded: bool },

    /// An up-to-date rep was passed on without compiling.
    Skipped { rep: RepKey },

    // === Selection ===
    /// A rep was handed out for an attempt.
    Attempt { attempt: AttemptId, rep: RepKey },

    /// The attempt was suspended on a rep that is not compiled yet.
    UnmetDependency {
        attempt: AttemptId,
        rep: RepKey,
        dependency: RepKey,
        need: NeedKind,
    },

    /// The attempt succeeded.
    Compiled { attempt: AttemptId, rep: RepKey },

    /// Suspended reps wait on each other.
    CycleDetected {
        path: Vec<CycleStep>,
        /// The rendered diagnostic.
        message: String,
    },
}

impl FlowEvent {
    /// Build a `CycleDetected` event from a cycle report.
    pub fn cycle<R: Rep>(cycle: &DependencyCycle<R>) -> Self {
        FlowEvent::CycleDetected {
            path: cycle
                .entries()
                .iter()
                .map(|entry| CycleStep {
                    rep: RepKey::of(&entry.rep),
                    need: entry.need,
                })
                .collect(),
            message: cycle.to_string(),
        }
    }

    /// The rep this event is about, if it names exactly one.
    pub fn rep(&self) -> Option<&RepKey> {
        match self {
            FlowEvent::Skipped { rep }
            | FlowEvent::Attempt { rep, .. }
            | FlowEvent::UnmetDependency { rep, .. }
            | FlowEvent::Compiled { rep, .. } => Some(rep),
            FlowEvent::RunStart { .. }
            | FlowEvent::RunEnd { .. }
            | FlowEvent::CycleDetected { .. } => None,
        }
    }
}

/// A recorded sequence of events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionTrace {
    pub events: Vec<FlowEvent>,
}

/// Event kind for comparison (without attempt ids or the rendered message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    RunStart { total: usize, outdated: usize },
    RunEnd { succeeded: bool },
    Skipped { rep: RepKey },
    Attempt { rep: RepKey },
    UnmetDependency { rep: RepKey, dependency: RepKey, need: NeedKind },
    Compiled { rep: RepKey },
    CycleDetected { path: Vec<RepKey> },
}

impl From<&FlowEvent> for EventKind {
    fn from(event: &FlowEvent) -> Self {
        match event {
            FlowEvent::RunStart { total, outdated } => EventKind::RunStart {
                total: *total,
                outdated: *outdated,
            },
            FlowEvent::RunEnd { succeeded } => EventKind::RunEnd {
                succeeded: *succeeded,
            },
            FlowEvent::Skipped { rep } => EventKind::Skipped { rep: rep.clone() },
            FlowEvent::Attempt { rep, .. } => EventKind::Attempt { rep: rep.clone() },
            FlowEvent::UnmetDependency {
                rep,
                dependency,
                need,
                ..
            } => EventKind::UnmetDependency {
                rep: rep.clone(),
                dependency: dependency.clone(),
                need: *need,
            },
            FlowEvent::Compiled { rep, .. } => EventKind::Compiled { rep: rep.clone() },
            FlowEvent::CycleDetected { path, .. } => EventKind::CycleDetected {
                path: path.iter().map(|step| step.rep.clone()).collect(),
            },
        }
    }
}

/// Convert a trace to a list of event kinds for comparison.
pub fn to_kinds(trace: &ExecutionTrace) -> Vec<EventKind> {
    trace.events.iter().map(EventKind::from).collect()
}

impl ExecutionTrace {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: FlowEvent) {
        self.events.push(event);
    }

    /// Reps in attempt order, repeats included.
    pub fn attempted(&self) -> Vec<&RepKey> {
        self.events
            .iter()
            .filter_map(|e| match e {
                FlowEvent::Attempt { rep, .. } => Some(rep),
                _ => None,
            })
            .collect()
    }

    /// Reps in the order their attempts succeeded.
    pub fn compiled(&self) -> Vec<&RepKey> {
        self.events
            .iter()
            .filter_map(|e| match e {
                FlowEvent::Compiled { rep, .. } => Some(rep),
                _ => None,
            })
            .collect()
    }

    /// Filter events for a specific rep.
    ///
    /// An unmet dependency matches both the suspended rep and the dependency.
    pub fn events_for_rep(&self, rep: &RepKey) -> Vec<&FlowEvent> {
        self.events
            .iter()
            .filter(|e| match e {
                FlowEvent::UnmetDependency { dependency, .. } if dependency == rep => true,
                FlowEvent::CycleDetected { path, .. } => path.iter().any(|s| &s.rep == rep),
                other => other.rep() == Some(rep),
            })
            .collect()
    }

    /// Check if any event matches a predicate.
    pub fn has_event<F>(&self, predicate: F) -> bool
    where
        F: Fn(&FlowEvent) -> bool,
    {
        self.events.iter().any(predicate)
    }

    /// Serialize the trace as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Read a trace written by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rep_flow::{CycleEntry, ItemRep};

    fn attempt(n: u64, rep: &str) -> FlowEvent {
        FlowEvent::Attempt {
            attempt: AttemptId(n),
            rep: rep.into(),
        }
    }

    #[test]
    fn test_rep_key_from_display() {
        let key = RepKey::of(&ItemRep::new("/foo.md", "default"));
        assert_eq!(key.as_str(), "item /foo.md, rep :default");
    }

    #[test]
    fn test_execution_trace() {
        let mut trace = ExecutionTrace::new();
        trace.push(attempt(1, "a"));
        trace.push(FlowEvent::UnmetDependency {
            attempt: AttemptId(1),
            rep: "a".into(),
            dependency: "b".into(),
            need: NeedKind::CompiledContent,
        });
        trace.push(attempt(2, "b"));
        trace.push(FlowEvent::Compiled {
            attempt: AttemptId(2),
            rep: "b".into(),
        });
        trace.push(attempt(3, "a"));
        trace.push(FlowEvent::Compiled {
            attempt: AttemptId(3),
            rep: "a".into(),
        });

        assert_eq!(
            trace.attempted(),
            vec![&RepKey::from("a"), &RepKey::from("b"), &RepKey::from("a")]
        );
        assert_eq!(trace.compiled(), vec![&RepKey::from("b"), &RepKey::from("a")]);
        // The unmet dependency event names `b` too.
        assert_eq!(trace.events_for_rep(&"b".into()).len(), 3);
        assert!(trace.has_event(|e| matches!(e, FlowEvent::UnmetDependency { .. })));
    }

    #[test]
    fn test_cycle_event() {
        let cycle = DependencyCycle::new(vec![
            CycleEntry {
                rep: "a",
                need: NeedKind::Path,
            },
            CycleEntry {
                rep: "b",
                need: NeedKind::CompiledContent,
            },
        ]);

        let FlowEvent::CycleDetected { path, message } = FlowEvent::cycle(&cycle) else {
            panic!("expected a cycle event");
        };
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].need, NeedKind::Path);
        assert_eq!(message, cycle.to_string());
    }

    #[test]
    fn test_json_roundtrip_keeps_order() {
        let mut trace = ExecutionTrace::new();
        trace.push(FlowEvent::RunStart {
            total: 2,
            outdated: 1,
        });
        trace.push(attempt(1, "a"));
        trace.push(FlowEvent::Skipped { rep: "b".into() });
        trace.push(FlowEvent::RunEnd { succeeded: true });

        let json = trace.to_json().unwrap();
        assert!(json.contains("\"Skipped\""));
        assert_eq!(ExecutionTrace::from_json(&json).unwrap(), trace);
    }
}
