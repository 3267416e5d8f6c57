//! Freezing resolved context trees into immutable output models.

use std::collections::HashMap;
use std::sync::Arc;

use espalier_foundation::{QName, SchemaPath};
use espalier_model::{DeclaredModel, DeclaredStmt, EffectiveModel, EffectiveStmt};
use espalier_vocab::CopyPolicy;

use crate::context::ContextId;
use crate::executor::Build;

impl Build<'_> {
    /// Freezes the declared view: every source root with only its
    /// declared substatements, raw arguments verbatim.
    ///
    /// Inherited copies always append after the declared prefix of a
    /// child list, so the declared tree is recovered by truncation.
    pub(crate) fn materialize_declared(&self) -> DeclaredModel {
        let roots = self
            .sources
            .iter()
            .map(|info| self.declare(info.root))
            .collect();
        DeclaredModel::new(roots)
    }

    fn declare(&self, ctx: ContextId) -> Arc<DeclaredStmt> {
        let node = self.arena.node(ctx);
        let children = node.children[..node.declared_children]
            .iter()
            .map(|&child| self.declare(child))
            .collect();
        Arc::new(DeclaredStmt::new(
            node.keyword.clone(),
            node.raw.clone(),
            node.at.clone(),
            children,
        ))
    }

    /// Freezes the effective view: one statement tree per module, with
    /// submodule bodies appended after the module's own children in
    /// include order, withdrawn subtrees dropped, and Reuse-policy nodes
    /// shared structurally across all their use sites.
    pub(crate) fn materialize_effective(&self) -> EffectiveModel {
        let mut shared: HashMap<ContextId, Arc<EffectiveStmt>> = HashMap::new();
        let mut modules = im::Vector::new();
        for info in &self.sources {
            if info.submodule {
                continue;
            }
            let node = self.arena.node(info.root);
            let path = SchemaPath::root();
            let mut children = im::Vector::new();
            for child in self.module_scope_children(info.root) {
                if let Some(stmt) = self.freeze(child, &path, &mut shared) {
                    children.push_back(stmt);
                }
            }
            modules.push_back(Arc::new(EffectiveStmt::new(
                node.keyword.clone(),
                node.resolved.clone(),
                node.at.clone(),
                path,
                children,
                None,
            )));
        }
        EffectiveModel::new(modules)
    }

    fn freeze(
        &self,
        ctx: ContextId,
        parent_path: &SchemaPath,
        shared: &mut HashMap<ContextId, Arc<EffectiveStmt>>,
    ) -> Option<Arc<EffectiveStmt>> {
        let node = self.arena.node(ctx);
        if !node.supported {
            return None;
        }
        // Reuse copies freeze their origin once and alias it everywhere.
        if let Some(origin) = node.origin {
            if self.vocab.copy_policy(&node.keyword) == CopyPolicy::Reuse {
                if let Some(existing) = shared.get(&origin) {
                    return Some(Arc::clone(existing));
                }
                let stmt = self.freeze_node(origin, parent_path, shared);
                shared.insert(origin, Arc::clone(&stmt));
                return Some(stmt);
            }
        }
        Some(self.freeze_node(ctx, parent_path, shared))
    }

    fn freeze_node(
        &self,
        ctx: ContextId,
        parent_path: &SchemaPath,
        shared: &mut HashMap<ContextId, Arc<EffectiveStmt>>,
    ) -> Arc<EffectiveStmt> {
        let node = self.arena.node(ctx);
        let path = match (self.vocab.is_data_node(&node.keyword), node.name()) {
            (true, Some(name)) => parent_path.child(QName::new(
                Arc::clone(&node.module),
                Arc::clone(name),
            )),
            _ => parent_path.clone(),
        };
        let mut children = im::Vector::new();
        for &child in &node.children {
            if let Some(stmt) = self.freeze(child, &path, &mut *shared) {
                children.push_back(stmt);
            }
        }
        Arc::new(EffectiveStmt::new(
            node.keyword.clone(),
            node.resolved.clone(),
            node.at.clone(),
            path,
            children,
            node.derived.clone(),
        ))
    }
}
