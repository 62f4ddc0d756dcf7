//! Integration tests for the Flow Inspector.
//!
//! These tests verify that events are emitted in scheduling order.

use std::sync::Arc;

use rep_flow::{AttemptError, Compiler, Item, ItemRep, RepSelector, Scope, Site};
use rep_flow_inspector::{
    to_kinds, EventCollector, EventKind, EventSinkTracer, ExecutionTrace, FilterSink, FlowEvent,
    NeedKind, RepKey,
};

// ============================================================================
// Helper
// ============================================================================

fn r(description: &str) -> RepKey {
    RepKey::new(description)
}

/// Reps `a` to `e`, each needing the next one.
fn run_linear(tracer: EventSinkTracer) {
    let chain = ["a", "b", "c", "d", "e"];
    let mut done: Vec<&str> = Vec::new();

    RepSelector::with_tracer(chain, tracer)
        .run(|rep| {
            let idx = chain.iter().position(|r| r == rep).unwrap();
            if let Some(next) = chain.get(idx + 1) {
                if !done.contains(next) {
                    return Err(rep_flow::UnmetDependency::compiled_content(*next).into());
                }
            }
            done.push(*rep);
            Ok(())
        })
        .unwrap();
}

/// A page using a layout.
struct Blog {
    items: Vec<Item>,
    outdated: Vec<ItemRep>,
    compiled: Vec<ItemRep>,
}

impl Blog {
    fn new() -> Self {
        let items = vec![
            Item::new("home", "/index.md"),
            Item::new("layout", "/default.html"),
        ];
        let outdated = items.iter().map(|item| item.rep("default")).collect();
        Self {
            items,
            outdated,
            compiled: Vec::new(),
        }
    }
}

impl Site for Blog {
    type Item = Item;
    type Rep = ItemRep;

    fn reps(&self) -> Vec<ItemRep> {
        self.items.iter().map(|item| item.rep("default")).collect()
    }

    fn reps_of(&self, item: &Item) -> Vec<ItemRep> {
        vec![item.rep("default")]
    }

    fn is_outdated(&self, rep: &ItemRep) -> bool {
        self.outdated.contains(rep)
    }

    fn compile_rep(&mut self, rep: &ItemRep) -> Result<(), AttemptError<ItemRep>> {
        let layout = ItemRep::new("/default.html", "default");
        if *rep != layout && self.outdated.contains(&layout) && !self.compiled.contains(&layout) {
            return Err(AttemptError::unmet(layout, NeedKind::CompiledContent));
        }
        self.compiled.push(rep.clone());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_linear_selection_events() {
    use EventKind::*;

    let collector = Arc::new(EventCollector::new());
    run_linear(EventSinkTracer::new(collector.clone()));

    let trace = collector.trace();
    assert_eq!(
        trace.attempted(),
        ["a", "b", "c", "d", "e", "d", "c", "b", "a"]
            .map(r)
            .iter()
            .collect::<Vec<_>>()
    );
    assert_eq!(
        trace.compiled(),
        ["e", "d", "c", "b", "a"].map(r).iter().collect::<Vec<_>>()
    );

    let kinds = to_kinds(&trace);
    assert_eq!(
        &kinds[..4],
        [
            Attempt { rep: r("a") },
            UnmetDependency {
                rep: r("a"),
                dependency: r("b"),
                need: NeedKind::CompiledContent,
            },
            Attempt { rep: r("b") },
            UnmetDependency {
                rep: r("b"),
                dependency: r("c"),
                need: NeedKind::CompiledContent,
            },
        ]
    );
}

#[test]
fn test_attempt_ids_are_sequential() {
    let collector = Arc::new(EventCollector::new());
    run_linear(EventSinkTracer::new(collector.clone()));

    let ids: Vec<u64> = collector
        .events()
        .iter()
        .filter_map(|e| match e {
            FlowEvent::Attempt { attempt, .. } => Some(attempt.0),
            _ => None,
        })
        .collect();
    assert_eq!(ids, (1..=9).collect::<Vec<_>>());
}

#[test]
fn test_cycle_event() {
    let collector = Arc::new(EventCollector::new());
    let tracer = EventSinkTracer::new(collector.clone());

    let result = RepSelector::with_tracer(["a", "b"], tracer).run(|rep| {
        let other = if *rep == "a" { "b" } else { "a" };
        Err(rep_flow::UnmetDependency::new(other, NeedKind::Path).into())
    });
    assert!(result.is_err());

    let trace = collector.trace();
    let Some(FlowEvent::CycleDetected { path, message }) = trace.events.last() else {
        panic!("expected the trace to end with a cycle");
    };
    assert_eq!(
        path.iter().map(|step| step.rep.clone()).collect::<Vec<_>>(),
        [r("a"), r("b")]
    );
    assert!(path.iter().all(|step| step.need == NeedKind::Path));
    assert_eq!(
        message,
        "The site cannot be compiled because there is a dependency cycle:\n\
         \n    (1) a, uses path of\
         \n    (2) b, uses path of (1)\n"
    );
    assert!(trace.compiled().is_empty());
}

#[test]
fn test_compiler_run_events() {
    use EventKind::*;

    let collector = Arc::new(EventCollector::new());
    let mut compiler = Compiler::builder(Blog::new())
        .tracer(EventSinkTracer::new(collector.clone()))
        .build();

    compiler
        .run(Scope::All, false, &mut |_: &ItemRep, _: bool| {})
        .unwrap();

    let page = r("item /index.md, rep :default");
    let layout = r("item /default.html, rep :default");
    assert_eq!(
        to_kinds(&collector.trace()),
        vec![
            RunStart {
                total: 2,
                outdated: 2
            },
            Attempt { rep: page.clone() },
            UnmetDependency {
                rep: page.clone(),
                dependency: layout.clone(),
                need: NeedKind::CompiledContent,
            },
            Attempt {
                rep: layout.clone()
            },
            Compiled {
                rep: layout.clone()
            },
            Attempt { rep: page.clone() },
            Compiled { rep: page.clone() },
            RunEnd { succeeded: true },
        ]
    );

    // Second run: only the page is outdated.
    collector.clear();
    compiler.site_mut().outdated = vec![ItemRep::new("/index.md", "default")];
    compiler
        .run(Scope::All, false, &mut |_: &ItemRep, _: bool| {})
        .unwrap();

    assert_eq!(
        to_kinds(&collector.trace()),
        vec![
            RunStart {
                total: 2,
                outdated: 1
            },
            Attempt { rep: page.clone() },
            Compiled { rep: page },
            Skipped { rep: layout },
            RunEnd { succeeded: true },
        ]
    );
}

#[test]
fn test_filtered_sink() {
    let collector = Arc::new(EventCollector::new());
    let sink = FilterSink::new(
        |e| matches!(e, FlowEvent::Compiled { .. }),
        collector.clone(),
    );
    run_linear(EventSinkTracer::new(Arc::new(sink)));

    assert_eq!(collector.len(), 5);
}

#[test]
fn test_trace_json_export() {
    let collector = Arc::new(EventCollector::new());
    run_linear(EventSinkTracer::new(collector.clone()));

    let trace = collector.trace();
    let json = trace.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["events"][0]["Attempt"]["rep"], "a");
    assert_eq!(value["events"][0]["Attempt"]["attempt"], 1);
    assert_eq!(value["events"][1]["UnmetDependency"]["need"], "CompiledContent");
    assert_eq!(ExecutionTrace::from_json(&json).unwrap(), trace);
}
