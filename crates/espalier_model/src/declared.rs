//! The as-written view of a build: raw arguments, declared children only.

use std::fmt;
use std::sync::Arc;

use espalier_foundation::SourceRef;
use espalier_vocab::Keyword;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One statement exactly as declared: keyword, raw argument, and the
/// substatements that were written in the source (no expansions, no
/// overlays).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeclaredStmt {
    keyword: Keyword,
    argument: Option<Arc<str>>,
    at: SourceRef,
    children: im::Vector<Arc<DeclaredStmt>>,
}

impl DeclaredStmt {
    /// Creates a declared statement.
    #[must_use]
    pub fn new(
        keyword: Keyword,
        argument: Option<Arc<str>>,
        at: SourceRef,
        children: im::Vector<Arc<DeclaredStmt>>,
    ) -> Self {
        Self {
            keyword,
            argument,
            at,
            children,
        }
    }

    /// The statement keyword.
    #[must_use]
    pub fn keyword(&self) -> &Keyword {
        &self.keyword
    }

    /// The raw argument text, if any.
    #[must_use]
    pub fn argument(&self) -> Option<&Arc<str>> {
        self.argument.as_ref()
    }

    /// Where the statement was declared.
    #[must_use]
    pub fn at(&self) -> &SourceRef {
        &self.at
    }

    /// The declared substatements, in document order.
    #[must_use]
    pub fn children(&self) -> &im::Vector<Arc<DeclaredStmt>> {
        &self.children
    }

    /// The first substatement of the given kind, if present.
    #[must_use]
    pub fn child(&self, keyword: &Keyword) -> Option<&Arc<DeclaredStmt>> {
        self.children.iter().find(|c| &c.keyword == keyword)
    }
}

impl fmt::Display for DeclaredStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, "{} \"{argument}\"", self.keyword),
            None => write!(f, "{}", self.keyword),
        }
    }
}

/// The declared-only result of a build: one root per source, in
/// registration order.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeclaredModel {
    roots: im::Vector<Arc<DeclaredStmt>>,
}

impl DeclaredModel {
    /// Wraps the source roots into a model.
    #[must_use]
    pub fn new(roots: im::Vector<Arc<DeclaredStmt>>) -> Self {
        Self { roots }
    }

    /// All source roots in registration order.
    #[must_use]
    pub fn roots(&self) -> &im::Vector<Arc<DeclaredStmt>> {
        &self.roots
    }

    /// The root declared under the given module or submodule name.
    #[must_use]
    pub fn root(&self, name: &str) -> Option<&Arc<DeclaredStmt>> {
        self.roots
            .iter()
            .find(|r| r.argument().is_some_and(|a| a.as_ref() == name))
    }
}
