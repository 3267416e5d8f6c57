//! The context arena: the mutable, in-progress statement trees.
//!
//! Every statement under resolution is a [`ContextNode`] owned by a
//! per-build [`ContextArena`] and addressed by a stable [`ContextId`].
//! Registries and actions hold ids, never references, so copy operations
//! and pending-action bookkeeping can never produce dangling or aliased
//! ownership. Contexts are never freed mid-build.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use espalier_foundation::{Arg, Error, Result, SourceRef};
use espalier_source::{Source, StatementEvent};
use espalier_types::DerivedType;
use espalier_vocab::{DefKind, Keyword};

use crate::phase::Phase;

/// Stable index of a context in its arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub(crate) u32);

impl ContextId {
    /// The raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextId({})", self.0)
    }
}

/// One statement under resolution.
#[derive(Clone, Debug)]
pub struct ContextNode {
    /// Statement keyword.
    pub keyword: Keyword,
    /// Raw argument text as declared.
    pub raw: Option<Arc<str>>,
    /// Declaration site, for diagnostics.
    pub at: SourceRef,
    /// Owning parent; `None` only for source roots.
    pub parent: Option<ContextId>,
    /// Children in resolution order. The declared prefix of this list is
    /// tracked by `declared_children`.
    pub children: Vec<ContextId>,
    /// Namespace identity: the module this context's names bind to.
    pub module: Arc<str>,
    /// Index of the owning source in the build session.
    pub source: usize,
    /// The typed argument, once parsed. Write-once.
    pub resolved: Option<Arg>,
    /// Highest completed phase.
    pub completed: Option<Phase>,
    /// For inherited copies, the context this one was copied from.
    pub origin: Option<ContextId>,
    /// Cleared by a `deviate not-supported`; unsupported subtrees are
    /// skipped at materialization.
    pub supported: bool,
    /// Set once a `uses` context has been expanded, so copies of it are
    /// never expanded again.
    pub expanded: bool,
    /// How many leading children were declared (as opposed to copied in).
    pub declared_children: usize,
    /// The composed type, on `type` contexts.
    pub derived: Option<Arc<DerivedType>>,
    /// Tree-scoped definitions registered on this context, visible to it
    /// and its descendants. Ordered for deterministic iteration.
    pub definitions: BTreeMap<(DefKind, Arc<str>), ContextId>,
}

impl ContextNode {
    /// The identifier this context is named by: the resolved identifier
    /// when available, otherwise the raw argument.
    #[must_use]
    pub fn name(&self) -> Option<&Arc<str>> {
        match &self.resolved {
            Some(Arg::Ident(name)) => Some(name),
            Some(Arg::Str(text)) => Some(text),
            _ => self.raw.as_ref(),
        }
    }

    /// Whether this context has completed the given phase.
    #[must_use]
    pub fn reached(&self, phase: Phase) -> bool {
        self.completed.is_some_and(|completed| completed >= phase)
    }
}

/// Arena of context nodes for one build session.
#[derive(Debug, Default)]
pub struct ContextArena {
    nodes: Vec<ContextNode>,
}

impl ContextArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no context has been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All ids in creation order. The iterator borrows nothing, so it
    /// stays valid while nodes are mutated.
    pub fn ids(&self) -> impl Iterator<Item = ContextId> + use<> {
        #[allow(clippy::cast_possible_truncation)]
        (0..self.nodes.len() as u32).map(ContextId)
    }

    /// Shared access to a node.
    #[must_use]
    pub fn node(&self, id: ContextId) -> &ContextNode {
        &self.nodes[id.index()]
    }

    /// Mutable access to a node. Reactor-internal.
    pub fn node_mut(&mut self, id: ContextId) -> &mut ContextNode {
        &mut self.nodes[id.index()]
    }

    /// Appends a node, wiring it into its parent's child list.
    pub fn push(&mut self, node: ContextNode) -> ContextId {
        #[allow(clippy::cast_possible_truncation)]
        let id = ContextId(self.nodes.len() as u32);
        let parent = node.parent;
        self.nodes.push(node);
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    /// Sets the resolved argument. Write-once: a second write is an
    /// internal invariant breach.
    ///
    /// # Errors
    ///
    /// `Internal` when the argument was already resolved.
    pub fn set_resolved(&mut self, id: ContextId, arg: Arg) -> Result<()> {
        let node = self.node_mut(id);
        if node.resolved.is_some() {
            return Err(Error::internal(format!(
                "argument of \"{}\" resolved twice",
                node.keyword
            ))
            .at(node.at.clone()));
        }
        node.resolved = Some(arg);
        Ok(())
    }

    /// Loads one source into the arena, preserving declared order.
    ///
    /// Arguments stay raw; the module identity defaults to the root's own
    /// argument (submodules are rebound to their parent module during
    /// linkage).
    pub fn load(&mut self, source: &Source, source_index: usize) -> ContextId {
        let root = source.root();
        let module: Arc<str> = root
            .argument
            .clone()
            .unwrap_or_else(|| Arc::clone(source.name()));
        self.load_event(source, source_index, root, None, &module)
    }

    fn load_event(
        &mut self,
        source: &Source,
        source_index: usize,
        event: &StatementEvent,
        parent: Option<ContextId>,
        module: &Arc<str>,
    ) -> ContextId {
        let id = self.push(ContextNode {
            keyword: Keyword::parse(&event.keyword),
            raw: event.argument.clone(),
            at: source.reference(event.span),
            parent,
            children: Vec::new(),
            module: Arc::clone(module),
            source: source_index,
            resolved: None,
            completed: None,
            origin: None,
            supported: true,
            expanded: false,
            declared_children: event.children.len(),
            derived: None,
            definitions: BTreeMap::new(),
        });
        for child in &event.children {
            self.load_event(source, source_index, child, Some(id), module);
        }
        id
    }

    /// All ids of the subtree rooted at `id`, preorder.
    #[must_use]
    pub fn subtree(&self, id: ContextId) -> Vec<ContextId> {
        let mut ids = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            ids.push(current);
            let node = self.node(current);
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        ids
    }

    /// The first child of `id` with the given keyword.
    #[must_use]
    pub fn child_by_keyword(&self, id: ContextId, keyword: &Keyword) -> Option<ContextId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .find(|&c| &self.node(c).keyword == keyword)
    }

    /// All children of `id` with the given keyword, in order.
    pub fn children_by_keyword<'a>(
        &'a self,
        id: ContextId,
        keyword: &'a Keyword,
    ) -> impl Iterator<Item = ContextId> + 'a {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(move |&c| &self.node(c).keyword == keyword)
    }

    /// Walks the lexical scope chain from `start` outward.
    ///
    /// Copies resolve references at their definition site: a context with
    /// an origin continues the walk there instead of at its destination
    /// parent.
    pub fn scope_chain(&self, start: ContextId) -> impl Iterator<Item = ContextId> + '_ {
        let mut current = Some(start);
        std::iter::from_fn(move || {
            let id = current?;
            let node = self.node(id);
            current = node.origin.or(node.parent);
            Some(id)
        })
    }

    /// Looks up a tree-scoped definition visible from `from`.
    #[must_use]
    pub fn lookup_definition(
        &self,
        from: ContextId,
        kind: DefKind,
        name: &Arc<str>,
    ) -> Option<ContextId> {
        let key = (kind, Arc::clone(name));
        self.scope_chain(from)
            .find_map(|id| self.node(id).definitions.get(&key).copied())
    }

    /// Registers a tree-scoped definition on `scope`.
    ///
    /// # Errors
    ///
    /// `Duplicate` when the scope already holds that name, with both
    /// declaration sites attached.
    pub fn register_definition(
        &mut self,
        scope: ContextId,
        kind: DefKind,
        name: Arc<str>,
        definition: ContextId,
    ) -> Result<()> {
        let defined_at = self.node(definition).at.clone();
        let node = self.node_mut(scope);
        if let Some(&existing) = node.definitions.get(&(kind, Arc::clone(&name))) {
            let existing_at = self.node(existing).at.clone();
            return Err(Error::duplicate(format!(
                "{} \"{name}\" defined twice in the same scope",
                kind_text(kind)
            ))
            .at(defined_at)
            .also(existing_at));
        }
        node.definitions.insert((kind, name), definition);
        Ok(())
    }
}

fn kind_text(kind: DefKind) -> &'static str {
    match kind {
        DefKind::Grouping => "grouping",
        DefKind::Typedef => "typedef",
        DefKind::Identity => "identity",
    }
}
