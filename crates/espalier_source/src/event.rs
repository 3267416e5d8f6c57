//! Named sources and their statement-event trees.

use std::fmt;
use std::sync::Arc;

use espalier_foundation::{SourceRef, Span};

/// One statement exactly as the external parser saw it: keyword text, an
/// optional raw (unparsed) argument, its span, and its substatements in
/// document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatementEvent {
    /// Keyword text, e.g. `"container"`.
    pub keyword: Arc<str>,
    /// Raw argument text, if the statement has one.
    pub argument: Option<Arc<str>>,
    /// Position of the statement in its source.
    pub span: Span,
    /// Substatements in document order.
    pub children: Vec<StatementEvent>,
}

impl StatementEvent {
    /// Creates a statement event with an argument.
    pub fn new(keyword: impl Into<Arc<str>>, argument: impl Into<Arc<str>>) -> Self {
        Self {
            keyword: keyword.into(),
            argument: Some(argument.into()),
            span: Span::default(),
            children: Vec::new(),
        }
    }

    /// Creates an argument-less statement event.
    pub fn bare(keyword: impl Into<Arc<str>>) -> Self {
        Self {
            keyword: keyword.into(),
            argument: None,
            span: Span::default(),
            children: Vec::new(),
        }
    }

    /// Sets the span.
    #[must_use]
    pub const fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Appends a substatement, preserving document order.
    #[must_use]
    pub fn with(mut self, child: StatementEvent) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several substatements, preserving document order.
    #[must_use]
    pub fn with_all(mut self, children: impl IntoIterator<Item = StatementEvent>) -> Self {
        self.children.extend(children);
        self
    }

    /// Counts this statement plus all statements below it.
    #[must_use]
    pub fn statement_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(StatementEvent::statement_count)
            .sum::<usize>()
    }
}

impl fmt::Display for StatementEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, "{} \"{}\"", self.keyword, argument),
            None => write!(f, "{}", self.keyword),
        }
    }
}

/// A named source: one root statement event per source module/submodule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    name: Arc<str>,
    root: StatementEvent,
}

impl Source {
    /// Wraps a root statement event under a source name.
    pub fn new(name: impl Into<Arc<str>>, root: StatementEvent) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    /// Returns the source name.
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Returns the root statement event.
    #[must_use]
    pub fn root(&self) -> &StatementEvent {
        &self.root
    }

    /// Returns a reference to the given span within this source.
    #[must_use]
    pub fn reference(&self, span: Span) -> SourceRef {
        SourceRef::new(Arc::clone(&self.name), span)
    }

    /// Counts all statements in the source.
    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.root.statement_count()
    }
}
