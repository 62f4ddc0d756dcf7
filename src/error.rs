//! Error types for compile attempts, selection and whole runs.

use std::fmt;

use thiserror::Error;

use crate::cycle::DependencyCycle;
use crate::rep::Rep;
use crate::signal::{NeedKind, UnmetDependency};

/// Failure outcome of a single compile attempt.
///
/// `Unmet` is the expected "not ready yet" outcome and is consumed by the
/// selector, which retries the attempt later. `Failed` is a genuine
/// compilation failure and aborts the run unchanged.
///
/// Both conversions are provided, so compile code can use `?` on either an
/// [`UnmetDependency`] or anything that converts into `anyhow::Error`:
///
/// ```ignore
/// fn compile(rep: &ItemRep, store: &Store) -> Result<(), AttemptError<ItemRep>> {
///     let layout = store.compiled(&layout_rep)?; // Err(UnmetDependency)
///     let html = render(layout).context("rendering layout")?; // anyhow
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub enum AttemptError<R> {
    /// A dependency's output is not available yet.
    Unmet(UnmetDependency<R>),
    /// Any other failure.
    Failed(anyhow::Error),
}

impl<R> AttemptError<R> {
    /// Signal that `rep`'s `need` is not available yet.
    pub fn unmet(rep: R, need: NeedKind) -> Self {
        AttemptError::Unmet(UnmetDependency::new(rep, need))
    }

    pub fn is_unmet(&self) -> bool {
        matches!(self, AttemptError::Unmet(_))
    }

    /// Returns the dependency signal if this is an `Unmet` variant.
    pub fn unmet_dependency(&self) -> Option<&UnmetDependency<R>> {
        match self {
            AttemptError::Unmet(unmet) => Some(unmet),
            AttemptError::Failed(_) => None,
        }
    }
}

impl<R: fmt::Display> fmt::Display for AttemptError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Unmet(unmet) => write!(f, "{}", unmet),
            AttemptError::Failed(e) => write!(f, "{}", e),
        }
    }
}

impl<R> From<UnmetDependency<R>> for AttemptError<R> {
    fn from(unmet: UnmetDependency<R>) -> Self {
        AttemptError::Unmet(unmet)
    }
}

impl<R> From<anyhow::Error> for AttemptError<R> {
    fn from(err: anyhow::Error) -> Self {
        AttemptError::Failed(err)
    }
}

/// Error returned by [`RepSelector::run`](crate::RepSelector::run).
#[derive(Debug, Error)]
pub enum SelectError<R: Rep> {
    /// The active chain closed on itself.
    #[error(transparent)]
    DependencyCycle(#[from] DependencyCycle<R>),

    /// An attempt failed for a reason other than an unmet dependency.
    ///
    /// The error is passed through exactly as the attempt returned it.
    #[error(transparent)]
    Attempt(anyhow::Error),
}

/// Error returned by [`Compiler::run`](crate::Compiler::run).
#[derive(Debug, Error)]
pub enum CompileError<R: Rep> {
    /// The site could not load its data or prepare its output.
    #[error("failed to load site data")]
    Load(#[source] anyhow::Error),

    /// A dependency cycle; displays as the full cycle report.
    #[error(transparent)]
    DependencyCycle(#[from] DependencyCycle<R>),

    /// Compiling `rep` failed; `source` is the original error.
    #[error("error while compiling {rep}")]
    Compilation {
        rep: R,
        #[source]
        source: anyhow::Error,
    },
}

impl<R: Rep> CompileError<R> {
    /// The rep being compiled when the run failed, if any.
    pub fn rep(&self) -> Option<&R> {
        match self {
            CompileError::Compilation { rep, .. } => Some(rep),
            _ => None,
        }
    }

    /// The original failure, unwrapped from any context this crate added.
    pub fn unwrap_source(&self) -> Option<&anyhow::Error> {
        match self {
            CompileError::Load(source) | CompileError::Compilation { source, .. } => Some(source),
            CompileError::DependencyCycle(_) => None,
        }
    }
}
