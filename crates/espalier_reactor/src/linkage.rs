//! Source pre-linkage and linkage: global registration, imports,
//! includes, prefix tables.

use std::collections::HashMap;
use std::sync::Arc;

use espalier_foundation::Error;
use espalier_vocab::Keyword;

use crate::action::{ActionId, Outcome, Wait};
use crate::context::ContextId;
use crate::executor::Build;
use crate::namespace::NsKind;

impl Build<'_> {
    /// Registers a source root into the global namespaces, making it
    /// discoverable by name (and, for modules, by `namespace@revision`).
    pub(crate) fn register_source(&mut self, root: ContextId) -> Outcome {
        let node = self.arena.node(root);
        let keyword = node.keyword.clone();
        let at = node.at.clone();
        let Some(name) = node.raw.clone() else {
            self.errors
                .push(Error::syntax(format!("{keyword} requires a name argument")).at(at));
            return Outcome::Done;
        };

        let ns = match keyword {
            Keyword::Module => NsKind::Module,
            Keyword::Submodule => NsKind::Submodule,
            other => {
                self.errors.push(
                    Error::syntax(format!(
                        "a source must start with module or submodule, not \"{other}\""
                    ))
                    .at(at),
                );
                return Outcome::Done;
            }
        };

        match self.globals.register(ns, name, root, at.clone()) {
            Ok(woken) => self.wake_all(woken),
            Err(error) => self.errors.push(error),
        }

        // Modules are additionally keyed by namespace-uri@revision so
        // that two names for one model surface as one duplicate.
        if ns == NsKind::Module {
            if let Some(uri) = self.namespace_uri(root) {
                let key: Arc<str> = match self.latest_revision(root) {
                    Some(revision) => Arc::from(format!("{uri}@{revision}")),
                    None => uri,
                };
                match self.globals.register(NsKind::ModuleNamespace, key, root, at) {
                    Ok(woken) => self.wake_all(woken),
                    Err(error) => self.errors.push(error),
                }
            }
        }
        Outcome::Done
    }

    fn namespace_uri(&self, root: ContextId) -> Option<Arc<str>> {
        self.arena
            .child_by_keyword(root, &Keyword::Namespace)
            .and_then(|c| self.arena.node(c).raw.clone())
    }

    /// The lexically greatest revision date declared on a source.
    fn latest_revision(&self, root: ContextId) -> Option<Arc<str>> {
        self.arena
            .children_by_keyword(root, &Keyword::Revision)
            .filter_map(|c| self.arena.node(c).raw.clone())
            .max()
    }

    /// Links one source: binds its prefix table, resolves imports and
    /// includes, and for submodules rebinds the whole subtree to the
    /// parent module's namespace.
    ///
    /// The computed tables commit only once every referenced source is
    /// present, so a retried attempt never double-applies.
    pub(crate) fn link_source(&mut self, _id: ActionId, root: ContextId) -> Outcome {
        let node = self.arena.node(root);
        let submodule = node.keyword == Keyword::Submodule;
        let own_name = Arc::clone(&node.module);
        let source_index = node.source;

        let mut prefixes: HashMap<Arc<str>, Arc<str>> = HashMap::new();
        let mut includes: Vec<Arc<str>> = Vec::new();
        let mut collected: Vec<Error> = Vec::new();
        let mut parent_module: Option<Arc<str>> = None;

        if submodule {
            match self.arena.child_by_keyword(root, &Keyword::BelongsTo) {
                Some(belongs) => {
                    let Some(parent) = self.arena.node(belongs).raw.clone() else {
                        self.errors.push(
                            Error::syntax("belongs-to requires a module name")
                                .at(self.arena.node(belongs).at.clone()),
                        );
                        return Outcome::Done;
                    };
                    // A submodule is only meaningful with its module.
                    if self.module_root(&parent).is_none() {
                        return Outcome::Waiting(Wait::Global {
                            kind: NsKind::Module,
                            key: parent,
                        });
                    }
                    if let Some(prefix) = self
                        .arena
                        .child_by_keyword(belongs, &Keyword::Prefix)
                        .and_then(|c| self.arena.node(c).raw.clone())
                    {
                        prefixes.insert(prefix, Arc::clone(&parent));
                    } else {
                        collected.push(
                            Error::cardinality("belongs-to requires a prefix substatement")
                                .at(self.arena.node(belongs).at.clone()),
                        );
                    }
                    parent_module = Some(parent);
                }
                None => {
                    self.errors.push(
                        Error::cardinality("submodule requires a belongs-to substatement")
                            .at(self.arena.node(root).at.clone()),
                    );
                    return Outcome::Done;
                }
            }
        } else if let Some(prefix) = self
            .arena
            .child_by_keyword(root, &Keyword::Prefix)
            .and_then(|c| self.arena.node(c).raw.clone())
        {
            prefixes.insert(prefix, Arc::clone(&own_name));
        }

        let imports: Vec<ContextId> = self
            .arena
            .children_by_keyword(root, &Keyword::Import)
            .collect();
        for import in imports {
            let Some(target) = self.arena.node(import).raw.clone() else {
                collected.push(
                    Error::syntax("import requires a module name")
                        .at(self.arena.node(import).at.clone()),
                );
                continue;
            };
            if self.module_root(&target).is_none() {
                return Outcome::Waiting(Wait::Global {
                    kind: NsKind::Module,
                    key: target,
                });
            }
            match self
                .arena
                .child_by_keyword(import, &Keyword::Prefix)
                .and_then(|c| self.arena.node(c).raw.clone())
            {
                Some(prefix) => {
                    prefixes.insert(prefix, target);
                }
                None => collected.push(
                    Error::cardinality("import requires a prefix substatement")
                        .at(self.arena.node(import).at.clone()),
                ),
            }
        }

        let include_ids: Vec<ContextId> = self
            .arena
            .children_by_keyword(root, &Keyword::Include)
            .collect();
        for include in include_ids {
            let Some(target) = self.arena.node(include).raw.clone() else {
                collected.push(
                    Error::syntax("include requires a submodule name")
                        .at(self.arena.node(include).at.clone()),
                );
                continue;
            };
            let Some(sub_root) = self.globals.lookup(NsKind::Submodule, &target) else {
                return Outcome::Waiting(Wait::Global {
                    kind: NsKind::Submodule,
                    key: target,
                });
            };
            let belongs = self
                .arena
                .child_by_keyword(sub_root, &Keyword::BelongsTo)
                .and_then(|c| self.arena.node(c).raw.clone());
            if belongs.as_deref() == Some(own_name.as_ref()) {
                includes.push(target);
            } else {
                collected.push(
                    Error::cross_reference(format!(
                        "included submodule \"{target}\" belongs to \"{}\", not \"{own_name}\"",
                        belongs.as_deref().unwrap_or("<none>")
                    ))
                    .at(self.arena.node(include).at.clone())
                    .also(self.arena.node(sub_root).at.clone()),
                );
            }
        }

        // Commit.
        self.errors.extend(collected);
        if let Some(parent) = &parent_module {
            // Names in a submodule bind to the owning module's namespace.
            for ctx in self.arena.subtree(root) {
                self.arena.node_mut(ctx).module = Arc::clone(parent);
            }
        }
        let info = &mut self.sources[source_index];
        info.prefixes = prefixes;
        info.includes = includes;
        info.parent_module = parent_module;
        Outcome::Done
    }
}
