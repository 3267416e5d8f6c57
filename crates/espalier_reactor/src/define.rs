//! Statement definition: argument parsing, substatement cardinality,
//! definition registration.

use std::sync::Arc;

use espalier_foundation::Error;
use espalier_vocab::{DefKind, Keyword};

use crate::action::Outcome;
use crate::context::ContextId;
use crate::executor::Build;
use crate::namespace::NsKind;

impl Build<'_> {
    /// Defines one statement: parses its argument into typed form,
    /// checks substatement occurrences, and registers any named
    /// definition it introduces.
    ///
    /// Prefix translation happens here, so every error a malformed or
    /// unbound argument can cause surfaces at the declaration site.
    pub(crate) fn define_statement(&mut self, ctx: ContextId) -> Outcome {
        let keyword = self.arena.node(ctx).keyword.clone();
        let Some(support) = self.vocab.support(&keyword) else {
            // Unregistered extension statements pass through untyped.
            return Outcome::Done;
        };
        let rule = support.arg;
        let defines = support.defines;

        let raw = self.arena.node(ctx).raw.clone();
        match rule.parse(raw.as_deref(), &self.prefixes_of(ctx)) {
            Ok(Some(arg)) => {
                if let Err(error) = self.arena.set_resolved(ctx, arg) {
                    self.errors.push(error);
                }
            }
            Ok(None) => {}
            Err(error) => {
                self.collect(error, ctx);
                return Outcome::Done;
            }
        }

        // `modifier` admits exactly one token.
        if keyword == Keyword::Modifier && raw.as_deref() != Some("invert-match") {
            self.collect(
                Error::syntax(format!(
                    "invalid modifier \"{}\"",
                    raw.as_deref().unwrap_or("")
                )),
                ctx,
            );
            return Outcome::Done;
        }

        let present: Vec<Keyword> = self
            .arena
            .node(ctx)
            .children
            .iter()
            .map(|&c| self.arena.node(c).keyword.clone())
            .collect();
        for error in support.validate_substatements(&present) {
            self.collect(error, ctx);
        }

        if let Some(kind) = defines {
            self.register_named(ctx, kind);
        }
        self.check_data_sibling(ctx);
        Outcome::Done
    }

    /// Two sibling data nodes carrying one name in one module collide.
    /// A submodule's top level counts as a sibling of the owning
    /// module's top level, so cross-source collisions surface too. Only
    /// the later declaration reports, so each pair yields one error.
    fn check_data_sibling(&mut self, ctx: ContextId) {
        if !self.vocab.is_data_node(&self.arena.node(ctx).keyword) {
            return;
        }
        let Some(name) = self.arena.node(ctx).name().cloned() else {
            return;
        };
        let module = Arc::clone(&self.arena.node(ctx).module);
        let Some(parent) = self.arena.node(ctx).parent else {
            return;
        };
        let siblings: Vec<ContextId> = if self.arena.node(parent).parent.is_none() {
            self.module_root(&module).map_or_else(
                || self.arena.node(parent).children.clone(),
                |root| self.module_scope_children(root),
            )
        } else {
            self.arena.node(parent).children.clone()
        };
        let earlier = siblings.into_iter().find(|&c| {
            c < ctx && {
                let node = self.arena.node(c);
                self.vocab.is_data_node(&node.keyword)
                    && node.module == module
                    && node.name() == Some(&name)
            }
        });
        if let Some(existing) = earlier {
            self.errors.push(
                Error::duplicate(format!(
                    "data node \"{name}\" is defined twice in the same scope"
                ))
                .at(self.arena.node(ctx).at.clone())
                .also(self.arena.node(existing).at.clone()),
            );
        }
    }

    fn register_named(&mut self, ctx: ContextId, kind: DefKind) {
        let Some(name) = self.arena.node(ctx).name().cloned() else {
            return;
        };
        if kind == DefKind::Identity {
            let module = Arc::clone(&self.arena.node(ctx).module);
            let key: Arc<str> = Arc::from(format!("{module}:{name}"));
            let at = self.arena.node(ctx).at.clone();
            match self.globals.register(NsKind::Identity, key, ctx, at) {
                Ok(woken) => self.wake_all(woken),
                Err(error) => self.errors.push(error),
            }
            return;
        }

        let Some(parent) = self.arena.node(ctx).parent else {
            return;
        };
        let scope = self.promotion_scope(parent);
        if let Err(error) = self.arena.register_definition(scope, kind, name, ctx) {
            self.errors.push(error);
        }
    }

    /// Definitions declared at a submodule's top level register on the
    /// owning module's root, so every source of the module sees one
    /// scope and cross-submodule collisions surface as duplicates.
    fn promotion_scope(&self, parent: ContextId) -> ContextId {
        let node = self.arena.node(parent);
        if node.parent.is_some() || node.keyword != Keyword::Submodule {
            return parent;
        }
        self.source_of(parent)
            .parent_module
            .as_ref()
            .and_then(|name| self.module_root(name))
            .unwrap_or(parent)
    }
}
