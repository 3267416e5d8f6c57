//! Qualified statement identity.
//!
//! A statement that names a schema node is identified by a [`QName`]: its
//! local name bound to the namespace of the module that owns it. Chains of
//! identifier-bearing ancestors form a [`SchemaPath`], the address of a
//! node in the effective tree.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Qualified name: a local name in the namespace of an owning module.
///
/// Module identity is carried as the module name, which the build session
/// keeps unique (a duplicate module name is a build error). Ordering is
/// lexicographic on (module, name) so registries keyed by `QName` iterate
/// deterministically.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QName {
    module: Arc<str>,
    name: Arc<str>,
}

impl QName {
    /// Creates a qualified name.
    pub fn new(module: impl Into<Arc<str>>, name: impl Into<Arc<str>>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    /// Returns the owning module's name.
    #[must_use]
    pub fn module(&self) -> &Arc<str> {
        &self.module
    }

    /// Returns the local name.
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Returns this name rebound to another module's namespace.
    ///
    /// Used when an inherited subtree takes on the identity of its
    /// destination (grouping expansion at a use site).
    #[must_use]
    pub fn rebind(&self, module: &Arc<str>) -> Self {
        Self {
            module: Arc::clone(module),
            name: Arc::clone(&self.name),
        }
    }
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QName({}:{})", self.module, self.name)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.name)
    }
}

impl PartialOrd for QName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.module
            .cmp(&other.module)
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Path of qualified names from a root module to a schema node.
///
/// Persistent: extending a path shares structure with its prefix, so every
/// node in a deep tree can hold its own path cheaply.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SchemaPath {
    steps: im::Vector<QName>,
}

impl SchemaPath {
    /// Creates an empty (root) path.
    #[must_use]
    pub fn root() -> Self {
        Self {
            steps: im::Vector::new(),
        }
    }

    /// Creates a path from qualified name steps.
    #[must_use]
    pub fn of(steps: impl IntoIterator<Item = QName>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    /// Returns a new path with one more step appended.
    #[must_use]
    pub fn child(&self, step: QName) -> Self {
        let mut steps = self.steps.clone();
        steps.push_back(step);
        Self { steps }
    }

    /// Returns the final step, if the path is not the root.
    #[must_use]
    pub fn last(&self) -> Option<&QName> {
        self.steps.last()
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true for the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterates over the steps from root to leaf.
    pub fn iter(&self) -> impl Iterator<Item = &QName> {
        self.steps.iter()
    }
}

impl FromIterator<QName> for SchemaPath {
    fn from_iter<I: IntoIterator<Item = QName>>(iter: I) -> Self {
        Self::of(iter)
    }
}

impl fmt::Debug for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaPath({self})")
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "/");
        }
        for step in &self.steps {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}
