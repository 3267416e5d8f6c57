//! Copy-policy application: how statement subtrees are inherited.
//!
//! Every inheritance site (grouping expansion, augment insertion, refine
//! and deviate edits) funnels through [`copy_tree`], which consults each
//! statement kind's copy policy: Reject prunes the statement, Reuse makes
//! a shallow node that shares its origin's output at materialization, and
//! Copy duplicates the subtree with its namespace identity rebound to the
//! destination. Copies are independently owned subtrees, never aliases.

use std::collections::BTreeMap;
use std::sync::Arc;

use espalier_vocab::{CopyPolicy, Vocabulary};

use crate::context::{ContextArena, ContextId, ContextNode};

/// Copies the statement at `src` under `parent`, applying copy policies
/// throughout the subtree.
///
/// `module` is the namespace identity the copies take (the use site's
/// module for grouping expansion, the augmenting module for augment
/// insertion). Returns `None` when the root statement's policy rejects
/// inheritance.
pub fn copy_tree(
    arena: &mut ContextArena,
    vocab: &Vocabulary,
    src: ContextId,
    parent: ContextId,
    module: &Arc<str>,
) -> Option<ContextId> {
    let policy = vocab.copy_policy(&arena.node(src).keyword);
    match policy {
        CopyPolicy::Reject => None,
        CopyPolicy::Reuse => Some(copy_node(arena, src, parent, module)),
        CopyPolicy::Copy | CopyPolicy::Append => {
            let id = copy_node(arena, src, parent, module);
            let children: Vec<ContextId> = arena.node(src).children.clone();
            for child in children {
                copy_tree(arena, vocab, child, id, module);
            }
            Some(id)
        }
    }
}

/// Copies a single node (no children), recording provenance.
fn copy_node(
    arena: &mut ContextArena,
    src: ContextId,
    parent: ContextId,
    module: &Arc<str>,
) -> ContextId {
    let source_node = arena.node(src);
    let node = ContextNode {
        keyword: source_node.keyword.clone(),
        raw: source_node.raw.clone(),
        at: source_node.at.clone(),
        parent: Some(parent),
        children: Vec::new(),
        module: Arc::clone(module),
        source: arena.node(parent).source,
        resolved: source_node.resolved.clone(),
        completed: source_node.completed,
        // Provenance points at the immediate origin; scope walks follow
        // the chain back to the definition site.
        origin: Some(src),
        supported: source_node.supported,
        expanded: source_node.expanded,
        declared_children: 0,
        derived: source_node.derived.clone(),
        definitions: BTreeMap::new(),
    };
    arena.push(node)
}

/// Replaces the single existing `keyword` child of `target` with a copy
/// of `replacement`, or appends the copy if none exists yet.
///
/// This is Append-policy editing: the destination's already-copied
/// sibling is amended in place rather than duplicated again.
pub fn replace_child(
    arena: &mut ContextArena,
    vocab: &Vocabulary,
    target: ContextId,
    replacement: ContextId,
) -> Option<ContextId> {
    let keyword = arena.node(replacement).keyword.clone();
    let existing = arena
        .node(target)
        .children
        .iter()
        .position(|&c| arena.node(c).keyword == keyword);
    let module = Arc::clone(&arena.node(target).module);
    let copy = copy_tree(arena, vocab, replacement, target, &module)?;
    if let Some(index) = existing {
        // copy_tree appended the copy; move it into the old child's slot.
        let node = arena.node_mut(target);
        let appended = node.children.pop().expect("copy was appended");
        node.children[index] = appended;
    }
    Some(copy)
}
