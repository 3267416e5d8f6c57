//! Type composition and identity-base resolution.

use std::sync::Arc;

use espalier_foundation::{Arg, Error, QName};
use espalier_types::{Builtin, DerivedType, Pattern, Restrictions, TypeBase};
use espalier_vocab::{DefKind, Keyword};

use crate::action::{ActionId, Outcome, Wait};
use crate::context::ContextId;
use crate::executor::Build;
use crate::namespace::NsKind;

impl Build<'_> {
    /// Composes the derived type of one `type` context.
    ///
    /// The base is a builtin or the referenced typedef's already-composed
    /// type; derivation from a typedef therefore waits until that
    /// typedef's own `type` statement has composed. Typedef chains resolve
    /// in dependency order regardless of declaration order, and a chain
    /// that reaches itself stalls into the circularity report.
    pub(crate) fn compose_type(&mut self, _id: ActionId, ctx: ContextId) -> Outcome {
        if self.arena.node(ctx).derived.is_some() {
            return Outcome::Done;
        }
        let Some(Arg::Ref(reference)) = self.arena.node(ctx).resolved.clone() else {
            return Outcome::Done;
        };

        let builtin = if reference.module.is_none() {
            Builtin::from_name(&reference.name)
        } else {
            None
        };
        let base = if let Some(builtin) = builtin {
            TypeBase::Builtin(builtin)
        } else {
            let Some(typedef) = self.find_definition(
                ctx,
                DefKind::Typedef,
                reference.module.as_ref(),
                &reference.name,
            ) else {
                return Outcome::Waiting(Wait::Definition {
                    kind: DefKind::Typedef,
                    detail: format!("typedef \"{reference}\" is not visible from its use site"),
                });
            };
            let Some(inner) = self.arena.child_by_keyword(typedef, &Keyword::Type) else {
                // The typedef's own cardinality error was already reported.
                return Outcome::Done;
            };
            match self.arena.node(inner).derived.clone() {
                Some(derived) => TypeBase::Derived(derived),
                None => return Outcome::Waiting(Wait::DerivedReady { ctx: inner }),
            }
        };

        let delta = match self.gather_restrictions(ctx) {
            Ok(Some(delta)) => delta,
            Ok(None) => return Outcome::Done,
            Err(wait) => return Outcome::Waiting(wait),
        };

        // A bare reference shares the typedef's composed chain instead
        // of adding a link of its own.
        if delta.is_empty() {
            if let TypeBase::Derived(existing) = &base {
                self.arena.node_mut(ctx).derived = Some(Arc::clone(existing));
                self.wake_derived(ctx);
                return Outcome::Done;
            }
        }

        let name = self.typedef_name(ctx);
        match DerivedType::compose(name.clone(), base.clone(), &delta) {
            Ok(derived) => {
                self.arena.node_mut(ctx).derived = Some(derived);
                self.wake_derived(ctx);
            }
            Err(error) => {
                self.collect(error, ctx);
                // Poison with the bare base so dependents still compose;
                // the collected error fails the build regardless.
                if let Ok(fallback) = DerivedType::compose(name, base, &Restrictions::default()) {
                    self.arena.node_mut(ctx).derived = Some(fallback);
                    self.wake_derived(ctx);
                }
            }
        }
        Outcome::Done
    }

    /// Gathers the restriction delta declared under a `type` statement.
    ///
    /// `Ok(None)` when a substatement failed to parse (already reported);
    /// `Err(wait)` when an identityref base is not yet registered.
    fn gather_restrictions(&mut self, ctx: ContextId) -> Result<Option<Restrictions>, Wait> {
        let mut delta = Restrictions::default();
        let children: Vec<ContextId> = self.arena.node(ctx).children.clone();
        for child in children {
            let node = self.arena.node(child);
            match &node.keyword {
                Keyword::Range => {
                    if let Some(Arg::Ranges(expr)) = &node.resolved {
                        delta.range = Some(expr.clone());
                    } else {
                        return Ok(None);
                    }
                }
                Keyword::Length => {
                    if let Some(Arg::Ranges(expr)) = &node.resolved {
                        delta.length = Some(expr.clone());
                    } else {
                        return Ok(None);
                    }
                }
                Keyword::Pattern => {
                    let Some(text) = node.raw.clone() else {
                        return Ok(None);
                    };
                    let invert = self
                        .arena
                        .child_by_keyword(child, &Keyword::Modifier)
                        .is_some();
                    delta.patterns.push(if invert {
                        Pattern::inverted(text)
                    } else {
                        Pattern::of(text)
                    });
                }
                Keyword::Enum => {
                    let Some(name) = node.raw.clone() else {
                        return Ok(None);
                    };
                    let value = self
                        .arena
                        .child_by_keyword(child, &Keyword::Value)
                        .and_then(|v| match &self.arena.node(v).resolved {
                            Some(Arg::Int(value)) => Some(*value),
                            _ => None,
                        });
                    delta.enums.push((name, value));
                }
                Keyword::Bit => {
                    let Some(name) = node.raw.clone() else {
                        return Ok(None);
                    };
                    let position = self
                        .arena
                        .child_by_keyword(child, &Keyword::Position)
                        .and_then(|p| match &self.arena.node(p).resolved {
                            Some(Arg::Uint(position)) => Some(*position),
                            _ => None,
                        });
                    delta.bits.push((name, position));
                }
                Keyword::Path => {
                    delta.path = node.raw.clone();
                }
                Keyword::RequireInstance => {
                    if let Some(Arg::Bool(value)) = &node.resolved {
                        delta.require_instance = Some(*value);
                    }
                }
                Keyword::Base => {
                    let Some(Arg::Ref(reference)) = node.resolved.clone() else {
                        return Ok(None);
                    };
                    let module = reference
                        .module
                        .clone()
                        .unwrap_or_else(|| Arc::clone(&self.arena.node(ctx).module));
                    let key: Arc<str> = Arc::from(format!("{module}:{}", reference.name));
                    if self.globals.lookup(NsKind::Identity, &key).is_none() {
                        return Err(Wait::Global {
                            kind: NsKind::Identity,
                            key,
                        });
                    }
                    delta.base_identity = Some(QName::new(module, reference.name));
                }
                _ => {}
            }
        }
        Ok(Some(delta))
    }

    /// The qualified name a composed type carries: the enclosing
    /// typedef's, or none for inline types.
    fn typedef_name(&self, ctx: ContextId) -> Option<QName> {
        let parent = self.arena.node(ctx).parent?;
        let node = self.arena.node(parent);
        if node.keyword != Keyword::Typedef {
            return None;
        }
        let name = node.name()?;
        Some(QName::new(Arc::clone(&node.module), Arc::clone(name)))
    }

    /// Resolves an identity's `base` reference and checks the base chain
    /// for cycles.
    ///
    /// Every identity is globally registered before this phase, so an
    /// absent base parks until the stall report names it. A cycle is
    /// reported once, by its lowest-id member.
    pub(crate) fn resolve_identity(&mut self, ctx: ContextId) -> Outcome {
        let Some(base) = self.arena.child_by_keyword(ctx, &Keyword::Base) else {
            return Outcome::Done;
        };
        let Some(key) = self.identity_key(base, ctx) else {
            return Outcome::Done;
        };
        let Some(mut current) = self.globals.lookup(NsKind::Identity, &key) else {
            return Outcome::Waiting(Wait::Global {
                kind: NsKind::Identity,
                key,
            });
        };

        // Walk the base chain; revisiting the anchor is a cycle.
        let mut members = vec![ctx];
        loop {
            if current == ctx {
                if members.iter().min() == Some(&ctx) {
                    let mut error = Error::circular(format!(
                        "identity \"{}\" derives from itself",
                        self.arena.node(ctx).name().map_or("?", |n| n.as_ref())
                    ))
                    .at(self.arena.node(ctx).at.clone());
                    for &member in members.iter().skip(1) {
                        error = error.also(self.arena.node(member).at.clone());
                    }
                    self.errors.push(error);
                }
                return Outcome::Done;
            }
            if members.contains(&current) {
                // A cycle not involving the anchor; its own members report.
                return Outcome::Done;
            }
            members.push(current);
            let Some(next_base) = self.arena.child_by_keyword(current, &Keyword::Base) else {
                return Outcome::Done;
            };
            let Some(next_key) = self.identity_key(next_base, current) else {
                return Outcome::Done;
            };
            let Some(next) = self.globals.lookup(NsKind::Identity, &next_key) else {
                // The chain member's own action reports the absence.
                return Outcome::Done;
            };
            current = next;
        }
    }

    /// The global key of a `base` reference, qualified by the referring
    /// context's module when unprefixed.
    fn identity_key(&self, base: ContextId, referrer: ContextId) -> Option<Arc<str>> {
        let Some(Arg::Ref(reference)) = &self.arena.node(base).resolved else {
            return None;
        };
        let module = reference
            .module
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.arena.node(referrer).module));
        Some(Arc::from(format!("{module}:{}", reference.name)))
    }
}
