//! rep-flow: dependency-driven compilation scheduling for static sites.
//!
//! A site is made of item representations ("reps"). Compiling one rep may
//! need the output of another, but those dependencies are only discovered
//! while compiling. This crate schedules reps so that every rep is compiled
//! exactly once, never before what it needs, and reports circular waits
//! instead of looping.
//!
//! # Key Pieces
//!
//! - [`RepSelector`]: picks the next rep to attempt, reorders on
//!   [`UnmetDependency`] signals, and detects cycles on its active chain
//! - [`Compiler`]: runs a [`Site`] through the selector and notifies a
//!   [`CompileObserver`] once per rep
//! - [`DependencyCycle`]: the cycle report, whose `Display` is the
//!   user-facing diagnostic
//! - [`Tracer`]: observation hooks; [`TracingTracer`] forwards to `tracing`
//! - [`view`]: read-tracking collection views that describe what compile code
//!   read
//!
//! # Example
//!
//! ```ignore
//! use rep_flow::{AttemptError, RepSelector, UnmetDependency};
//!
//! let mut done = Vec::new();
//! RepSelector::new(["page", "layout"]).run(|rep| {
//!     if *rep == "page" && !done.contains(&"layout") {
//!         return Err(UnmetDependency::compiled_content("layout").into());
//!     }
//!     done.push(*rep);
//!     Ok(())
//! })?;
//! assert_eq!(done, ["layout", "page"]);
//! ```

mod compiler;
mod cycle;
mod error;
mod rep;
mod selector;
mod signal;
pub mod tracer;
pub mod view;

pub use compiler::{CompileObserver, Compiler, CompilerBuilder, Scope, Site};
pub use cycle::{CycleEntry, DependencyCycle};
pub use error::{AttemptError, CompileError, SelectError};
pub use rep::{Identifier, Item, ItemRep, Rep, RepName};
pub use selector::RepSelector;
pub use signal::{NeedKind, UnmetDependency};
pub use tracer::{AttemptId, NoopTracer, Tracer, TracingTracer};
