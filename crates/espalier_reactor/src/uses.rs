//! Grouping expansion at `uses` sites, including refine edits.

use std::sync::Arc;

use espalier_foundation::{Arg, Error, QName};
use espalier_vocab::{DefKind, Keyword};

use crate::action::{Outcome, Wait};
use crate::context::ContextId;
use crate::copy::{copy_tree, replace_child};
use crate::executor::Build;
use crate::phase::Phase;

impl Build<'_> {
    /// Expands one `uses` site: copies the referenced grouping's
    /// contents next to the site, rebound to the site's module, then
    /// applies the site's refines in declared order.
    ///
    /// Expansion waits until the grouping's own subtree has fully
    /// declared, so nested `uses` inside the grouping are already
    /// expanded and every use site receives the same content. A
    /// grouping that (transitively) uses itself therefore deadlocks
    /// into the circularity report instead of recursing.
    pub(crate) fn expand_uses(&mut self, ctx: ContextId) -> Outcome {
        if self.arena.node(ctx).expanded {
            return Outcome::Done;
        }
        let Some(Arg::Ref(reference)) = self.arena.node(ctx).resolved.clone() else {
            // The argument failed to parse; already reported.
            return Outcome::Done;
        };

        let Some(grouping) =
            self.find_definition(ctx, DefKind::Grouping, reference.module.as_ref(), &reference.name)
        else {
            return Outcome::Waiting(Wait::Definition {
                kind: DefKind::Grouping,
                detail: format!("grouping \"{reference}\" is not visible from its use site"),
            });
        };
        if !self.arena.node(grouping).reached(Phase::FullDeclaration) {
            return Outcome::Waiting(Wait::PhaseDone {
                ctx: grouping,
                phase: Phase::FullDeclaration,
            });
        }

        let parent = self
            .arena
            .node(ctx)
            .parent
            .unwrap_or(self.source_of(ctx).root);
        let module = Arc::clone(&self.arena.node(ctx).module);
        let first_copy = self.arena.node(parent).children.len();
        let grouping_children: Vec<ContextId> = self.arena.node(grouping).children.clone();
        for child in grouping_children {
            // Rebound copies land in the site's namespace, so an
            // expanded data node colliding with a declared sibling (or
            // another expansion's) is a duplicate.
            if self.vocab.is_data_node(&self.arena.node(child).keyword) {
                if let Some(name) = self.arena.node(child).name().cloned() {
                    if let Some(existing) = self.data_child(parent, &module, &name) {
                        self.errors.push(
                            Error::duplicate(format!(
                                "grouping expansion inserts \"{name}\", which the use site already has"
                            ))
                            .at(self.arena.node(ctx).at.clone())
                            .also(self.arena.node(existing).at.clone()),
                        );
                        continue;
                    }
                }
            }
            copy_tree(&mut self.arena, self.vocab, child, parent, &module);
        }
        self.arena.node_mut(ctx).expanded = true;

        let inserted: Vec<ContextId> =
            self.arena.node(parent).children[first_copy..].to_vec();
        let refines: Vec<ContextId> = self
            .arena
            .children_by_keyword(ctx, &Keyword::Refine)
            .collect();
        for refine in refines {
            self.apply_refine(refine, &inserted);
        }
        Outcome::Done
    }

    /// Applies one refine to its target among the freshly inserted
    /// copies. Single-valued properties replace in place; multi-valued
    /// ones append.
    fn apply_refine(&mut self, refine: ContextId, inserted: &[ContextId]) {
        let Some(Arg::NodeId(steps)) = self.arena.node(refine).resolved.clone() else {
            return;
        };
        let Some(target) = self.descend_fresh(inserted, &steps) else {
            self.collect(
                Error::cross_reference(format!(
                    "refine target \"{}\" is not part of the used grouping",
                    self.arena.node(refine).raw.as_deref().unwrap_or("?")
                )),
                refine,
            );
            return;
        };

        let target_keyword = self.arena.node(target).keyword.clone();
        let properties: Vec<ContextId> = self.arena.node(refine).children.clone();
        for property in properties {
            let keyword = self.arena.node(property).keyword.clone();
            let allowed = self
                .vocab
                .support(&target_keyword)
                .and_then(|s| s.cardinality_of(&keyword));
            let Some(cardinality) = allowed else {
                self.collect(
                    Error::constraint(format!(
                        "refine cannot set \"{keyword}\" on a {target_keyword}"
                    )),
                    property,
                );
                continue;
            };
            if cardinality.max == Some(1) {
                replace_child(&mut self.arena, self.vocab, target, property);
            } else {
                let module = Arc::clone(&self.arena.node(target).module);
                copy_tree(&mut self.arena, self.vocab, property, target, &module);
            }
        }
    }

    /// Walks a descendant node-id through freshly inserted subtrees.
    fn descend_fresh(&self, roots: &[ContextId], steps: &[QName]) -> Option<ContextId> {
        let mut candidates: Vec<ContextId> = roots.to_vec();
        let mut current = None;
        for step in steps {
            let found = candidates.iter().copied().find(|&c| {
                let node = self.arena.node(c);
                self.vocab.is_data_node(&node.keyword)
                    && node.module == *step.module()
                    && node.name() == Some(step.name())
            })?;
            current = Some(found);
            candidates = self.arena.node(found).children.clone();
        }
        current
    }

    /// Resolves a possibly module-qualified reference to a named
    /// definition.
    ///
    /// Local references walk the lexical scope chain from the use site
    /// (following copy origins back to definition sites), then fall back
    /// to the owning module's root scope, where top-level definitions of
    /// the module and all its submodules are registered. Qualified
    /// references to another module see only that module's root scope.
    pub(crate) fn find_definition(
        &self,
        from: ContextId,
        kind: DefKind,
        module: Option<&Arc<str>>,
        name: &Arc<str>,
    ) -> Option<ContextId> {
        let own = &self.arena.node(from).module;
        if let Some(module) = module {
            if module != own {
                let root = self.module_root(module)?;
                return self
                    .arena
                    .node(root)
                    .definitions
                    .get(&(kind, Arc::clone(name)))
                    .copied();
            }
        }
        if let Some(found) = self.arena.lookup_definition(from, kind, name) {
            return Some(found);
        }
        let root = self.module_root(own)?;
        self.arena
            .node(root)
            .definitions
            .get(&(kind, Arc::clone(name)))
            .copied()
    }
}
