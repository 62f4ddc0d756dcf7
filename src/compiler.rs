//! Compile orchestration.
//!
//! [`Compiler`] decides which reps a run covers, drives the outdated ones
//! through a [`RepSelector`] using the site's compile step, and notifies a
//! [`CompileObserver`] once per rep.

use std::collections::HashSet;

use crate::error::{AttemptError, CompileError};
use crate::rep::Rep;
use crate::selector::RepSelector;
use crate::tracer::{NoopTracer, Tracer};

/// The site being compiled: the collaborator that owns items and reps and
/// knows how to compile one rep.
///
/// Content transformations, data loading and output writing all happen
/// behind this trait.
pub trait Site {
    /// Item type reps belong to.
    type Item;
    /// Compilation unit.
    type Rep: Rep;

    /// Load site data and prepare the output location.
    fn load(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Every rep of the site, in its stable compilation order.
    fn reps(&self) -> Vec<Self::Rep>;

    /// The reps of one item.
    fn reps_of(&self, item: &Self::Item) -> Vec<Self::Rep>;

    /// Whether `rep` has to be recompiled in this run.
    fn is_outdated(&self, rep: &Self::Rep) -> bool;

    /// Compile `rep` once.
    ///
    /// Returns `AttemptError::Unmet` when compilation needs another rep that
    /// is not compiled yet; it will be called again for `rep` later. Must be
    /// safe to call repeatedly.
    fn compile_rep(&mut self, rep: &Self::Rep) -> Result<(), AttemptError<Self::Rep>>;
}

/// What a run compiles.
#[derive(Debug)]
pub enum Scope<'a, I> {
    /// Every rep of the site.
    All,
    /// The reps of a single item, plus whatever they turn out to need.
    Item(&'a I),
}

// Manual impls: `I` itself need not be `Clone`/`Copy`.
impl<I> Clone for Scope<'_, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I> Copy for Scope<'_, I> {}

/// Receives every rep once its status for the run is final.
///
/// Implemented for any `FnMut(&R, bool)`.
pub trait CompileObserver<R> {
    /// `rep` is done: compiled in this run, or already up to date. `forced`
    /// is the run's force flag.
    fn rep_compiled(&mut self, rep: &R, forced: bool);
}

impl<R, F: FnMut(&R, bool)> CompileObserver<R> for F {
    fn rep_compiled(&mut self, rep: &R, forced: bool) {
        self(rep, forced)
    }
}

/// Compiles a [`Site`].
///
/// # Example
///
/// ```ignore
/// let mut compiler = Compiler::builder(site).tracer(TracingTracer).build();
///
/// compiler.run(Scope::All, false, &mut |rep: &ItemRep, _forced: bool| {
///     println!("done: {rep}");
/// })?;
/// ```
pub struct Compiler<S: Site, T: Tracer<S::Rep> = NoopTracer> {
    site: S,
    tracer: T,
}

impl<S: Site> Compiler<S> {
    /// Create a compiler with default settings.
    pub fn new(site: S) -> Self {
        Self::builder(site).build()
    }

    /// Create a builder for customizing the compiler.
    pub fn builder(site: S) -> CompilerBuilder<S> {
        CompilerBuilder::new(site)
    }
}

impl<S: Site, T: Tracer<S::Rep>> Compiler<S, T> {
    pub fn site(&self) -> &S {
        &self.site
    }

    pub fn site_mut(&mut self) -> &mut S {
        &mut self.site
    }

    pub fn into_site(self) -> S {
        self.site
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    /// Compile the reps in `scope`.
    ///
    /// Reps are compiled when `force` is set or the site reports them as
    /// outdated; the rest are only passed to `observer`. Every rep that ends
    /// up done, including dependencies outside `scope`, reaches `observer`
    /// exactly once.
    ///
    /// # Errors
    ///
    /// - `CompileError::Load` - the site failed to load
    /// - `CompileError::DependencyCycle` - reps wait on each other
    /// - `CompileError::Compilation` - compiling a rep failed
    pub fn run<O>(
        &mut self,
        scope: Scope<'_, S::Item>,
        force: bool,
        observer: &mut O,
    ) -> Result<(), CompileError<S::Rep>>
    where
        O: CompileObserver<S::Rep> + ?Sized,
    {
        let Self { site, tracer } = self;

        site.load().map_err(CompileError::Load)?;

        let reps = match scope {
            Scope::All => site.reps(),
            Scope::Item(item) => site.reps_of(item),
        };
        let (outdated, up_to_date): (Vec<_>, Vec<_>) = reps
            .into_iter()
            .partition(|rep| force || site.is_outdated(rep));

        tracing::debug!(
            outdated = outdated.len(),
            up_to_date = up_to_date.len(),
            force,
            "compiling site"
        );
        tracer.on_run_start(outdated.len() + up_to_date.len(), outdated.len());

        let result = Self::compile_outdated(site, &*tracer, outdated, force, observer);
        let result = result.map(|mut notified| {
            for rep in up_to_date {
                if notified.insert(rep.clone()) {
                    tracer.on_skipped(&rep);
                    observer.rep_compiled(&rep, force);
                }
            }
        });

        tracer.on_run_end(result.is_ok());
        result
    }

    /// Runs the selector over `outdated`; returns the reps notified so far.
    fn compile_outdated<O>(
        site: &mut S,
        tracer: &T,
        outdated: Vec<S::Rep>,
        force: bool,
        observer: &mut O,
    ) -> Result<HashSet<S::Rep, ahash::RandomState>, CompileError<S::Rep>>
    where
        O: CompileObserver<S::Rep> + ?Sized,
    {
        let mut notified = HashSet::with_hasher(ahash::RandomState::new());
        let mut selector = RepSelector::with_tracer(outdated, tracer);

        while let Some(rep) = selector.next_attempt() {
            match site.compile_rep(&rep) {
                Ok(()) => {
                    selector.report(Ok(()))?;
                    if notified.insert(rep.clone()) {
                        observer.rep_compiled(&rep, force);
                    }
                }
                Err(AttemptError::Unmet(dependency)) => selector.report(Err(dependency))?,
                Err(AttemptError::Failed(source)) => {
                    tracing::debug!(rep = %rep, error = %source, "compilation failed");
                    return Err(CompileError::Compilation { rep, source });
                }
            }
        }

        Ok(notified)
    }
}

/// Builder for [`Compiler`].
pub struct CompilerBuilder<S: Site, T: Tracer<S::Rep> = NoopTracer> {
    site: S,
    tracer: T,
}

impl<S: Site> CompilerBuilder<S> {
    /// Create a new builder with default settings.
    pub fn new(site: S) -> Self {
        Self {
            site,
            tracer: NoopTracer,
        }
    }
}

impl<S: Site, T: Tracer<S::Rep>> CompilerBuilder<S, T> {
    /// Set the tracer that observes selection and compilation events.
    pub fn tracer<U: Tracer<S::Rep>>(self, tracer: U) -> CompilerBuilder<S, U> {
        CompilerBuilder {
            site: self.site,
            tracer,
        }
    }

    /// Build the compiler with the configured settings.
    pub fn build(self) -> Compiler<S, T> {
        Compiler {
            site: self.site,
            tracer: self.tracer,
        }
    }
}
