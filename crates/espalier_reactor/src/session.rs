//! The public build API: a reusable [`Reactor`] spawning one-shot
//! [`BuildSession`]s.

use std::sync::Arc;

use espalier_foundation::BuildFailure;
use espalier_model::{DeclaredModel, EffectiveModel};
use espalier_source::Source;
use espalier_vocab::Vocabulary;

use crate::config::ReactorLimits;
use crate::executor::Build;
use crate::phase::Phase;

/// A reusable resolution engine: a vocabulary plus execution limits.
///
/// Reactors are cheap to clone and share; each [`new_build`](Self::new_build)
/// call starts an independent session with fresh state.
///
/// ```
/// use espalier_reactor::Reactor;
/// use espalier_source::{Source, StatementEvent};
///
/// let source = Source::new(
///     "hello.esp",
///     StatementEvent::new("module", "hello")
///         .with(StatementEvent::new("namespace", "urn:hello"))
///         .with(StatementEvent::new("prefix", "h"))
///         .with(StatementEvent::new("leaf", "greeting").with(
///             StatementEvent::new("type", "string"),
///         )),
/// );
/// let model = Reactor::vanilla()
///     .new_build()
///     .add_source(source)
///     .build_effective()
///     .unwrap();
/// assert!(model.module("hello").is_some());
/// ```
#[derive(Clone, Debug)]
pub struct Reactor {
    vocab: Arc<Vocabulary>,
    limits: ReactorLimits,
}

impl Reactor {
    /// Creates a reactor over the vanilla vocabulary.
    #[must_use]
    pub fn vanilla() -> Self {
        Self::new(Vocabulary::vanilla())
    }

    /// Creates a reactor over a custom vocabulary (typically the vanilla
    /// set with extension statements registered on top).
    #[must_use]
    pub fn new(vocab: Vocabulary) -> Self {
        Self {
            vocab: Arc::new(vocab),
            limits: ReactorLimits::default(),
        }
    }

    /// Replaces the execution limits.
    #[must_use]
    pub fn with_limits(mut self, limits: ReactorLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The vocabulary this reactor resolves against.
    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Starts a fresh build session.
    #[must_use]
    pub fn new_build(&self) -> BuildSession {
        BuildSession {
            vocab: Arc::clone(&self.vocab),
            limits: self.limits,
            sources: Vec::new(),
        }
    }
}

/// One resolution run: sources in, one immutable model out.
#[derive(Debug)]
pub struct BuildSession {
    vocab: Arc<Vocabulary>,
    limits: ReactorLimits,
    sources: Vec<Source>,
}

impl BuildSession {
    /// Adds a source to the session. Order is irrelevant to the result;
    /// it only fixes module order in the output and error ordering.
    #[must_use]
    pub fn add_source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    /// Runs every phase and freezes the effective model.
    ///
    /// # Errors
    ///
    /// All failures collected up to the end of the failing phase, as one
    /// [`BuildFailure`]. No partial model is produced.
    pub fn build_effective(self) -> Result<EffectiveModel, BuildFailure> {
        let mut build = Build::new(&self.vocab, self.limits);
        for source in &self.sources {
            build.add_source(source);
        }
        build.run(Phase::EffectiveModel)?;
        Ok(build.materialize_effective())
    }

    /// Runs through full declaration only and freezes the declared view,
    /// raw arguments and all.
    ///
    /// # Errors
    ///
    /// As for [`build_effective`](Self::build_effective), for the phases
    /// that run.
    pub fn build_declared(self) -> Result<DeclaredModel, BuildFailure> {
        let mut build = Build::new(&self.vocab, self.limits);
        for source in &self.sources {
            build.add_source(source);
        }
        build.run(Phase::FullDeclaration)?;
        Ok(build.materialize_declared())
    }
}
