//! Augment insertion and deviation edits.

use std::sync::Arc;

use espalier_foundation::{Arg, DeviateKind, Error, QName};
use espalier_vocab::Keyword;

use crate::action::{Outcome, Wait};
use crate::context::ContextId;
use crate::copy::{copy_tree, replace_child};
use crate::executor::Build;

impl Build<'_> {
    /// Applies one augment: navigates its absolute target and inserts
    /// copies of its child nodes there.
    ///
    /// Inserted nodes keep the augmenting module's namespace identity,
    /// and the augment's `when` guard is copied onto every inserted
    /// child so the whole insertion stays conditional. A target step
    /// that does not resolve yet re-polls each round, because another
    /// augment may still produce it.
    pub(crate) fn apply_augment(&mut self, ctx: ContextId) -> Outcome {
        let Some(Arg::NodeId(steps)) = self.arena.node(ctx).resolved.clone() else {
            return Outcome::Done;
        };
        let target = match self.navigate_target(&steps) {
            Ok(target) => target,
            Err(None) => {
                self.collect(
                    Error::cross_reference(format!(
                        "augment target module \"{}\" does not exist in any source",
                        steps.first().map_or_else(String::new, |s| s.module().to_string())
                    )),
                    ctx,
                );
                return Outcome::Done;
            }
            Err(Some(missing)) => {
                return Outcome::Waiting(Wait::TargetPath {
                    target: steps,
                    missing,
                });
            }
        };

        let module = Arc::clone(&self.arena.node(ctx).module);
        let when_guard = self.arena.child_by_keyword(ctx, &Keyword::When);
        let children: Vec<ContextId> = self.arena.node(ctx).children.clone();
        for child in children {
            let keyword = self.arena.node(child).keyword.clone();
            if matches!(
                keyword,
                Keyword::When | Keyword::Description | Keyword::Reference | Keyword::Status
            ) {
                continue;
            }
            if self.vocab.is_data_node(&keyword) {
                if let Some(name) = self.arena.node(child).name().cloned() {
                    if let Some(existing) = self.data_child(target, &module, &name) {
                        self.errors.push(
                            Error::duplicate(format!(
                                "augment inserts \"{name}\", which the target already has"
                            ))
                            .at(self.arena.node(child).at.clone())
                            .also(self.arena.node(existing).at.clone()),
                        );
                        continue;
                    }
                }
            }
            let Some(copy) = copy_tree(&mut self.arena, self.vocab, child, target, &module) else {
                continue;
            };
            if let Some(guard) = when_guard {
                copy_tree(&mut self.arena, self.vocab, guard, copy, &module);
            }
            self.schedule_types_in(copy);
        }
        Outcome::Done
    }

    pub(crate) fn data_child(
        &self,
        parent: ContextId,
        module: &Arc<str>,
        name: &Arc<str>,
    ) -> Option<ContextId> {
        self.arena.node(parent).children.iter().copied().find(|&c| {
            let node = self.arena.node(c);
            node.supported
                && self.vocab.is_data_node(&node.keyword)
                && node.module == *module
                && node.name() == Some(name)
        })
    }

    /// Applies one deviation: after every augment has settled, edits the
    /// final target node with each `deviate` in declared order.
    ///
    /// The barrier makes deviations see the fully augmented tree; once
    /// it lifts, a missing target is a definite absence.
    pub(crate) fn apply_deviation(&mut self, ctx: ContextId) -> Outcome {
        if !self.augments_settled() {
            return Outcome::Waiting(Wait::AugmentsSettled);
        }
        let Some(Arg::NodeId(steps)) = self.arena.node(ctx).resolved.clone() else {
            return Outcome::Done;
        };
        let target = match self.navigate_target(&steps) {
            Ok(target) => target,
            Err(_) => {
                // An earlier deviation may have withdrawn the target;
                // editing a withdrawn node is a different failure than
                // referencing one that never existed.
                if let Some(withdrawn) = self.navigate_any(&steps) {
                    self.collect(
                        Error::constraint(format!(
                            "deviation edits \"{}\", which is already not supported",
                            crate::executor::display_path(&steps)
                        ))
                        .also(self.arena.node(withdrawn).at.clone()),
                        ctx,
                    );
                } else {
                    self.collect(
                        Error::cross_reference(format!(
                            "deviation target \"{}\" does not exist in any source",
                            crate::executor::display_path(&steps)
                        )),
                        ctx,
                    );
                }
                return Outcome::Done;
            }
        };

        let deviates: Vec<ContextId> = self
            .arena
            .children_by_keyword(ctx, &Keyword::Deviate)
            .collect();
        for deviate in deviates {
            let Some(Arg::Deviate(kind)) = self.arena.node(deviate).resolved.clone() else {
                continue;
            };
            if !self.arena.node(target).supported {
                self.collect(
                    Error::constraint(
                        "deviate follows a not-supported edit of the same target".to_string(),
                    ),
                    deviate,
                );
                continue;
            }
            match kind {
                DeviateKind::NotSupported => {
                    self.arena.node_mut(target).supported = false;
                }
                DeviateKind::Add => self.deviate_add(deviate, target),
                DeviateKind::Replace => self.deviate_replace(deviate, target),
                DeviateKind::Delete => self.deviate_delete(deviate, target),
            }
        }
        Outcome::Done
    }

    /// Like [`navigate_target`](Self::navigate_target) but also finds
    /// withdrawn nodes, for diagnosing edits of not-supported targets.
    fn navigate_any(&self, steps: &[QName]) -> Option<ContextId> {
        let first = steps.first()?;
        let module_root = self.module_root(first.module())?;
        let mut children = self.module_scope_children(module_root);
        let mut current = None;
        for step in steps {
            let found = children.iter().copied().find(|&c| {
                let node = self.arena.node(c);
                self.vocab.is_data_node(&node.keyword)
                    && node.module == *step.module()
                    && node.name() == Some(step.name())
            })?;
            current = Some(found);
            children = self.arena.node(found).children.clone();
        }
        current
    }

    fn deviate_add(&mut self, deviate: ContextId, target: ContextId) {
        let target_keyword = self.arena.node(target).keyword.clone();
        let properties: Vec<ContextId> = self.arena.node(deviate).children.clone();
        for property in properties {
            let keyword = self.arena.node(property).keyword.clone();
            let Some(cardinality) = self
                .vocab
                .support(&target_keyword)
                .and_then(|s| s.cardinality_of(&keyword))
            else {
                self.collect(
                    Error::constraint(format!(
                        "deviate add cannot put \"{keyword}\" on a {target_keyword}"
                    )),
                    property,
                );
                continue;
            };
            if cardinality.max == Some(1)
                && self.arena.child_by_keyword(target, &keyword).is_some()
            {
                self.collect(
                    Error::constraint(format!(
                        "deviate add of \"{keyword}\" conflicts with an existing one"
                    )),
                    property,
                );
                continue;
            }
            let module = Arc::clone(&self.arena.node(target).module);
            copy_tree(&mut self.arena, self.vocab, property, target, &module);
        }
    }

    fn deviate_replace(&mut self, deviate: ContextId, target: ContextId) {
        let properties: Vec<ContextId> = self.arena.node(deviate).children.clone();
        for property in properties {
            let keyword = self.arena.node(property).keyword.clone();
            if self.arena.child_by_keyword(target, &keyword).is_none() {
                self.collect(
                    Error::constraint(format!(
                        "deviate replace of \"{keyword}\" has nothing to replace"
                    )),
                    property,
                );
                continue;
            }
            if let Some(copy) = replace_child(&mut self.arena, self.vocab, target, property) {
                if keyword == Keyword::Type {
                    // The replacement type composes against its own base.
                    self.arena.node_mut(copy).derived = None;
                    self.schedule_types_in(copy);
                }
            }
        }
    }

    fn deviate_delete(&mut self, deviate: ContextId, target: ContextId) {
        let properties: Vec<ContextId> = self.arena.node(deviate).children.clone();
        for property in properties {
            let keyword = self.arena.node(property).keyword.clone();
            let argument = self.arena.node(property).raw.clone();
            let position = self.arena.node(target).children.iter().position(|&c| {
                let node = self.arena.node(c);
                node.keyword == keyword && node.raw == argument
            });
            match position {
                Some(index) => {
                    self.arena.node_mut(target).children.remove(index);
                }
                None => self.collect(
                    Error::constraint(format!(
                        "deviate delete of \"{keyword} {}\" matches nothing on the target",
                        argument.as_deref().unwrap_or("")
                    )),
                    property,
                ),
            }
        }
    }
}
