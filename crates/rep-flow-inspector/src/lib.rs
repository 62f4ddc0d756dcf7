//! Flow Inspector: event recording for rep-flow.
//!
//! [`EventSinkTracer`] implements [`rep_flow::Tracer`] and turns every
//! selector and compiler hook into a serializable [`FlowEvent`], delivered to
//! an [`EventSink`]:
//!
//! - **EventCollector**: collects events in memory for tests and assertions
//! - **MultiplexSink** / **FilterSink**: fan out and filter
//! - **NullSink**: drops everything
//!
//! # Quick Start
//!
//! ```ignore
//! use rep_flow::RepSelector;
//! use rep_flow_inspector::{EventCollector, EventSinkTracer, RepKey};
//! use std::sync::Arc;
//!
//! let collector = Arc::new(EventCollector::new());
//! let tracer = EventSinkTracer::new(collector.clone());
//!
//! RepSelector::with_tracer(["page", "layout"], tracer).run(|rep| compile(rep))?;
//!
//! let trace = collector.trace();
//! assert_eq!(trace.compiled(), [&RepKey::new("layout"), &RepKey::new("page")]);
//! std::fs::write("trace.json", trace.to_json()?)?;
//! ```

mod collector;
mod events;
mod sink;
mod tracer_impl;

pub use collector::EventCollector;
pub use events::{
    to_kinds, AttemptId, CycleStep, EventKind, ExecutionTrace, FlowEvent, NeedKind, RepKey,
};
pub use sink::{EventSink, FilterSink, MultiplexSink, NullSink};
pub use tracer_impl::EventSinkTracer;
