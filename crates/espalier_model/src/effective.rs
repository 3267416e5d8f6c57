//! The effective tree: the fully resolved, immutable output of a build.
//!
//! Created only by the materializer after every phase completes; never
//! mutated afterward, and safe for unsynchronized concurrent reads.

use std::fmt;
use std::sync::Arc;

use espalier_foundation::{Arg, QName, SchemaPath, SourceRef};
use espalier_types::DerivedType;
use espalier_vocab::Keyword;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One fully resolved statement: keyword, resolved argument, frozen
/// ordered children, derived schema path, and, for `type` statements,
/// the composed derived type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EffectiveStmt {
    keyword: Keyword,
    arg: Option<Arg>,
    at: SourceRef,
    path: SchemaPath,
    children: im::Vector<Arc<EffectiveStmt>>,
    derived: Option<Arc<DerivedType>>,
}

impl EffectiveStmt {
    /// Creates an effective statement. Called by the materializer only.
    #[must_use]
    pub fn new(
        keyword: Keyword,
        arg: Option<Arg>,
        at: SourceRef,
        path: SchemaPath,
        children: im::Vector<Arc<EffectiveStmt>>,
        derived: Option<Arc<DerivedType>>,
    ) -> Self {
        Self {
            keyword,
            arg,
            at,
            path,
            children,
            derived,
        }
    }

    /// The statement keyword.
    #[must_use]
    pub fn keyword(&self) -> &Keyword {
        &self.keyword
    }

    /// The resolved argument, if the statement has one.
    #[must_use]
    pub fn arg(&self) -> Option<&Arg> {
        self.arg.as_ref()
    }

    /// The identifier this statement is named by, if its argument is one.
    #[must_use]
    pub fn name(&self) -> Option<&Arc<str>> {
        match self.arg.as_ref()? {
            Arg::Ident(name) => Some(name),
            Arg::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Where the statement was declared (copies keep their declaration
    /// site for diagnostics).
    #[must_use]
    pub fn at(&self) -> &SourceRef {
        &self.at
    }

    /// The schema path of identifier-bearing ancestors, this statement
    /// included when it is a data node.
    #[must_use]
    pub fn path(&self) -> &SchemaPath {
        &self.path
    }

    /// The effective substatements, in resolved order.
    #[must_use]
    pub fn children(&self) -> &im::Vector<Arc<EffectiveStmt>> {
        &self.children
    }

    /// The composed derived type, on `type` statements.
    #[must_use]
    pub fn derived(&self) -> Option<&Arc<DerivedType>> {
        self.derived.as_ref()
    }

    /// The first substatement of the given kind, if present.
    #[must_use]
    pub fn child_by_keyword(&self, keyword: &Keyword) -> Option<&Arc<EffectiveStmt>> {
        self.children.iter().find(|c| &c.keyword == keyword)
    }

    /// All substatements of the given kind, in order.
    pub fn children_by_keyword<'a>(
        &'a self,
        keyword: &'a Keyword,
    ) -> impl Iterator<Item = &'a Arc<EffectiveStmt>> {
        self.children.iter().filter(move |c| &c.keyword == keyword)
    }

    /// The child data node addressed by the qualified name, if present.
    ///
    /// A data child is one whose own schema path ends with its name; this
    /// is the lookup data-tree builders use to walk the schema.
    #[must_use]
    pub fn data_child(&self, name: &QName) -> Option<&Arc<EffectiveStmt>> {
        self.children
            .iter()
            .find(|c| c.path.len() == self.path.len() + 1 && c.path.last() == Some(name))
    }

    /// The derived type of this statement's `type` substatement, the
    /// introspection hook for leaf-like nodes.
    #[must_use]
    pub fn leaf_type(&self) -> Option<&Arc<DerivedType>> {
        self.child_by_keyword(&Keyword::Type)
            .and_then(|t| t.derived.as_ref())
    }

    /// Walks the remaining steps of a schema path below this statement.
    #[must_use]
    pub fn descendant(&self, steps: &[QName]) -> Option<Arc<EffectiveStmt>> {
        let mut current = self.data_child(steps.first()?)?;
        for step in &steps[1..] {
            current = current.data_child(step)?;
        }
        Some(Arc::clone(current))
    }
}

impl fmt::Display for EffectiveStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Some(Arg::Ident(name)) => write!(f, "{} \"{name}\"", self.keyword),
            Some(Arg::Str(text)) => write!(f, "{} \"{text}\"", self.keyword),
            Some(arg) => write!(f, "{} {arg:?}", self.keyword),
            None => write!(f, "{}", self.keyword),
        }
    }
}

/// The fully resolved result of a build: one effective tree per module,
/// in registration order. Submodule bodies are folded into their modules.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EffectiveModel {
    modules: im::Vector<Arc<EffectiveStmt>>,
}

impl EffectiveModel {
    /// Wraps the module trees into a model.
    #[must_use]
    pub fn new(modules: im::Vector<Arc<EffectiveStmt>>) -> Self {
        Self { modules }
    }

    /// All module trees in registration order.
    #[must_use]
    pub fn modules(&self) -> &im::Vector<Arc<EffectiveStmt>> {
        &self.modules
    }

    /// The effective tree of the named module.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&Arc<EffectiveStmt>> {
        self.modules
            .iter()
            .find(|m| m.name().is_some_and(|n| n.as_ref() == name))
    }

    /// Resolves a schema path to its effective statement.
    ///
    /// The first step selects the module by namespace; the rest descend
    /// through data children.
    #[must_use]
    pub fn find(&self, path: &SchemaPath) -> Option<Arc<EffectiveStmt>> {
        let steps: Vec<QName> = path.iter().cloned().collect();
        let first = steps.first()?;
        let module = self.module(first.module())?;
        module.descendant(&steps)
    }
}
