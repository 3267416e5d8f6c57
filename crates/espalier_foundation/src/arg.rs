//! Resolved statement argument values.
//!
//! Raw arguments arrive as uninterpreted strings; during resolution the
//! vocabulary parses each one into an [`Arg`]. Once set on a context the
//! value is immutable for the rest of the build.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ident::QName;

/// The resolved (typed) argument of a statement.
///
/// One closed variant per argument shape the vanilla vocabulary produces.
/// Statements without an argument simply never get one.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Arg {
    /// A bare identifier naming the statement itself (e.g. a container name).
    Ident(Arc<str>),
    /// Free-form text (descriptions, patterns, expressions kept verbatim).
    Str(Arc<str>),
    /// A boolean argument (`config`, `mandatory`, `require-instance`, ...).
    Bool(bool),
    /// A signed integer argument (`value` of an enum member).
    Int(i64),
    /// An unsigned integer argument (`min-elements`, `position`, ...).
    Uint(u64),
    /// A lifecycle status argument.
    Status(Status),
    /// An `ordered-by` argument.
    OrderedBy(OrderedBy),
    /// A reference to a named definition, optionally module-qualified
    /// (`uses grp`, `type lib:port`, `base identity-name`).
    Ref(RefArg),
    /// A schema-node-id: absolute for augment/deviation targets, relative
    /// for refine targets. Steps are fully qualified at parse time.
    NodeId(Vec<QName>),
    /// A range or length expression, not yet checked against a base type.
    Ranges(RangeExpr),
    /// The edit kind carried by a `deviate` statement.
    Deviate(DeviateKind),
    /// A whitespace-separated list of key leaf names.
    Keys(Vec<Arc<str>>),
}

impl Arg {
    /// Returns the identifier if this argument is one.
    #[must_use]
    pub fn as_ident(&self) -> Option<&Arc<str>> {
        match self {
            Self::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the text if this argument is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&Arc<str>> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the boolean if this argument is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the unsigned integer if this argument is one.
    #[must_use]
    pub const fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the reference if this argument is one.
    #[must_use]
    pub fn as_ref_arg(&self) -> Option<&RefArg> {
        match self {
            Self::Ref(reference) => Some(reference),
            _ => None,
        }
    }
}

/// Reference to a named definition, optionally qualified by module.
///
/// The prefix (if any) was already translated to the target module's name
/// when the argument was parsed; an unqualified reference resolves
/// lexically at its definition site.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RefArg {
    /// Target module name, if the reference was prefixed.
    pub module: Option<Arc<str>>,
    /// Local name of the referenced definition.
    pub name: Arc<str>,
}

impl RefArg {
    /// Creates an unqualified (lexically scoped) reference.
    pub fn local(name: impl Into<Arc<str>>) -> Self {
        Self {
            module: None,
            name: name.into(),
        }
    }

    /// Creates a module-qualified reference.
    pub fn qualified(module: impl Into<Arc<str>>, name: impl Into<Arc<str>>) -> Self {
        Self {
            module: Some(module.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for RefArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(module) => write!(f, "{}:{}", module, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Lifecycle status of a definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    /// Definition is current and valid.
    #[default]
    Current,
    /// Definition is obsolescent; new uses are discouraged.
    Deprecated,
    /// Definition must not be used.
    Obsolete,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Deprecated => write!(f, "deprecated"),
            Self::Obsolete => write!(f, "obsolete"),
        }
    }
}

/// Ordering significance of list/leaf-list entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderedBy {
    /// Order is chosen by the system; entry order has no meaning.
    #[default]
    System,
    /// Order is chosen by the user and must be preserved.
    User,
}

/// The edit kind of a `deviate` statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviateKind {
    /// Insert a property that must not already be present.
    Add,
    /// Overwrite a property that must already be present.
    Replace,
    /// Remove a property whose current value must match.
    Delete,
    /// Remove the entire targeted node from the tree.
    NotSupported,
}

impl fmt::Display for DeviateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Replace => write!(f, "replace"),
            Self::Delete => write!(f, "delete"),
            Self::NotSupported => write!(f, "not-supported"),
        }
    }
}

/// One bound of a range part.
///
/// `Min` and `Max` resolve to the base type's own boundaries when the
/// expression is composed against a base.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RangeBound {
    /// The base type's lower boundary.
    Min,
    /// The base type's upper boundary.
    Max,
    /// An explicit value. Wide enough for the full unsigned 64-bit space.
    Value(i128),
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min => write!(f, "min"),
            Self::Max => write!(f, "max"),
            Self::Value(v) => write!(f, "{v}"),
        }
    }
}

/// One inclusive `[lo, hi]` part of a range expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangePart {
    /// Inclusive lower bound.
    pub lo: RangeBound,
    /// Inclusive upper bound.
    pub hi: RangeBound,
}

impl RangePart {
    /// Creates a part spanning `lo..=hi`.
    #[must_use]
    pub const fn new(lo: RangeBound, hi: RangeBound) -> Self {
        Self { lo, hi }
    }

    /// Creates a single-value part.
    #[must_use]
    pub const fn single(value: i128) -> Self {
        Self {
            lo: RangeBound::Value(value),
            hi: RangeBound::Value(value),
        }
    }
}

impl fmt::Display for RangePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lo == self.hi {
            write!(f, "{}", self.lo)
        } else {
            write!(f, "{}..{}", self.lo, self.hi)
        }
    }
}

/// An unresolved range or length expression: ordered alternative parts.
///
/// Ordering and disjointness are validated when the expression is composed
/// against a base type, because `min`/`max` only gain values there.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangeExpr {
    /// The parts, in declared order.
    pub parts: Vec<RangePart>,
}

impl RangeExpr {
    /// Creates an expression from parts.
    #[must_use]
    pub fn new(parts: Vec<RangePart>) -> Self {
        Self { parts }
    }
}

impl fmt::Display for RangeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}
