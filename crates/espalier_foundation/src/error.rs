//! Error types for the Espalier build pipeline.
//!
//! Uses `thiserror` for ergonomic error definition. Individual resolution
//! failures are [`Error`]s tagged with source locations; a build collects
//! every independent failure into one [`BuildFailure`] report rather than
//! stopping at the first.

use std::fmt;

use thiserror::Error as ThisError;

use crate::span::SourceRef;

/// Convenience alias for results carrying an Espalier [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A single resolution failure with the offending source location(s).
#[derive(Debug, Clone, ThisError)]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary offending location, when known.
    pub at: Option<SourceRef>,
    /// Further locations implicated in the failure (e.g. both ends of a
    /// duplicate pair, every member of a cycle).
    pub related: Vec<SourceRef>,
}

impl Error {
    /// Creates a new error with the given kind and no locations.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            at: None,
            related: Vec::new(),
        }
    }

    /// Attaches the primary source location.
    #[must_use]
    pub fn at(mut self, at: SourceRef) -> Self {
        self.at = Some(at);
        self
    }

    /// Attaches a further implicated location.
    #[must_use]
    pub fn also(mut self, reference: SourceRef) -> Self {
        self.related.push(reference);
        self
    }

    /// Creates a syntax error: a raw argument cannot be parsed into the
    /// shape its statement kind requires.
    #[must_use]
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax(message.into()))
    }

    /// Creates a cardinality error: a required substatement is missing or
    /// an exclusive one appears more than once.
    #[must_use]
    pub fn cardinality(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cardinality(message.into()))
    }

    /// Creates a cross-reference error: a deferred lookup whose target
    /// never exists in any source.
    #[must_use]
    pub fn cross_reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CrossReference(message.into()))
    }

    /// Creates a circularity error: actions mutually awaiting each other.
    #[must_use]
    pub fn circular(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Circular(message.into()))
    }

    /// Creates a constraint error: a restriction is not a subset of its
    /// base, or an edit targets a value inconsistent with current state.
    #[must_use]
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Constraint(message.into()))
    }

    /// Creates a duplicate-definition error.
    #[must_use]
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Duplicate(message.into()))
    }

    /// Creates a limit-exceeded error (resolution kill switch).
    #[must_use]
    pub fn limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Limit(message.into()))
    }

    /// Creates an internal invariant-breach error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, ThisError)]
pub enum ErrorKind {
    /// A raw argument cannot be parsed into the required shape.
    #[error("syntax: {0}")]
    Syntax(String),

    /// A statement kind's substatement occurrence rules were violated.
    #[error("cardinality: {0}")]
    Cardinality(String),

    /// A deferred lookup never resolves because its target does not exist
    /// in any source.
    #[error("unresolved reference: {0}")]
    CrossReference(String),

    /// Resolution stalled with actions mutually awaiting each other.
    #[error("circular dependency: {0}")]
    Circular(String),

    /// A restriction or edit is inconsistent with the current state.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Two sibling statements define the same identifier in one scope.
    #[error("duplicate definition: {0}")]
    Duplicate(String),

    /// A resolution limit (kill switch) was exceeded.
    #[error("limit exceeded: {0}")]
    Limit(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(at) = &self.at {
            write!(f, " (at {at})")?;
        }
        for reference in &self.related {
            write!(f, " (see {reference})")?;
        }
        Ok(())
    }
}

/// Aggregated report of every failure found during a build.
///
/// A build never fails on its first error: the current phase finishes
/// sweeping all sources so independent failures surface together. No
/// effective model is produced when this is returned.
#[derive(Debug, Clone, ThisError)]
pub struct BuildFailure {
    /// All collected errors, in the order they were encountered.
    pub errors: Vec<Error>,
}

impl BuildFailure {
    /// Wraps collected errors into a report.
    ///
    /// # Panics
    ///
    /// Panics if `errors` is empty; an empty failure is a logic error.
    #[must_use]
    pub fn new(errors: Vec<Error>) -> Self {
        assert!(!errors.is_empty(), "BuildFailure requires at least one error");
        Self { errors }
    }

    /// Returns the number of collected errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; a failure carries at least one error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if any error matches the given predicate.
    pub fn any(&self, predicate: impl Fn(&ErrorKind) -> bool) -> bool {
        self.errors.iter().any(|e| predicate(&e.kind))
    }
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "build failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            writeln!(f, "  - {error}")?;
        }
        Ok(())
    }
}
