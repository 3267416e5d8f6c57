//! Session-global namespaces with deferred lookups.
//!
//! Global keys (modules by name, modules by namespace+revision,
//! submodules, identities) live here. Tree-scoped keys (groupings,
//! typedefs) live on their defining context in the arena. A lookup either
//! finds a value or parks the asking action on a placeholder; resolving
//! the placeholder releases every waiter into the next round.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use espalier_foundation::{Error, Result, SourceRef};

use crate::action::ActionId;
use crate::context::ContextId;

/// The kind of a global namespace key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NsKind {
    /// Modules keyed by name.
    Module,
    /// Submodules keyed by name.
    Submodule,
    /// Modules keyed by `namespace-uri@revision`.
    ModuleNamespace,
    /// Identities keyed by `module:name`.
    Identity,
}

impl fmt::Display for NsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Module => "module",
            Self::Submodule => "submodule",
            Self::ModuleNamespace => "module namespace",
            Self::Identity => "identity",
        };
        write!(f, "{name}")
    }
}

/// A namespace entry: resolved exactly once, with waiters parked until
/// then.
#[derive(Debug, Default)]
struct NsEntry {
    value: Option<(ContextId, SourceRef)>,
    waiters: Vec<ActionId>,
}

/// The session-global key/value store.
#[derive(Debug, Default)]
pub struct GlobalNamespaces {
    entries: BTreeMap<(NsKind, Arc<str>), NsEntry>,
}

impl GlobalNamespaces {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value, waking every parked waiter.
    ///
    /// # Errors
    ///
    /// `Duplicate` when the key is already resolved, with both
    /// declaration sites attached.
    pub fn register(
        &mut self,
        kind: NsKind,
        key: Arc<str>,
        value: ContextId,
        at: SourceRef,
    ) -> Result<Vec<ActionId>> {
        let entry = self.entries.entry((kind, Arc::clone(&key))).or_default();
        if let Some((_, existing_at)) = &entry.value {
            return Err(Error::duplicate(format!("{kind} \"{key}\" registered twice"))
                .at(at)
                .also(existing_at.clone()));
        }
        entry.value = Some((value, at));
        Ok(std::mem::take(&mut entry.waiters))
    }

    /// Immediate lookup.
    #[must_use]
    pub fn lookup(&self, kind: NsKind, key: &str) -> Option<ContextId> {
        self.entries
            .get(&(kind, Arc::from(key)))
            .and_then(|entry| entry.value.as_ref())
            .map(|(value, _)| *value)
    }

    /// Deferred lookup: parks `waiter` on a placeholder for the key.
    /// The waiter is released by [`register`](Self::register).
    pub fn park(&mut self, kind: NsKind, key: Arc<str>, waiter: ActionId) {
        debug_assert!(
            self.lookup(kind, &key).is_none(),
            "parking on an already-resolved key"
        );
        self.entries
            .entry((kind, key))
            .or_default()
            .waiters
            .push(waiter);
    }
}
