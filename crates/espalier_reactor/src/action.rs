//! Pending resolution work.
//!
//! An action is one unit of work anchored to a context. An attempt either
//! completes or suspends on a precondition ([`Wait`]); suspended actions
//! are re-released when the precondition resolves, and a round in which
//! nothing completes while actions remain suspended is a stall.

use std::sync::Arc;

use espalier_foundation::QName;
use espalier_vocab::DefKind;

use crate::context::ContextId;
use crate::namespace::NsKind;
use crate::phase::Phase;

/// Identifier of an action within its build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActionId(pub(crate) u32);

impl ActionId {
    /// The raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What one action does when attempted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    /// Register a root into the global module namespaces.
    RegisterSource,
    /// Resolve imports/includes and bind the prefix table of a root.
    LinkSource,
    /// Parse the argument, validate cardinality, register definitions.
    DefineStatement,
    /// Expand the referenced grouping at this `uses` site, then refine.
    ExpandUses,
    /// Resolve an identity's base chain.
    ResolveIdentity,
    /// Compose this `type` context's derived type.
    ComposeType,
    /// Insert this augment's children at its target path.
    ApplyAugment,
    /// Apply this deviation's edits, after every augment settled.
    ApplyDeviation,
}

/// One scheduled action.
#[derive(Clone, Debug)]
pub struct Action {
    /// The context the action works on.
    pub anchor: ContextId,
    /// What the action does.
    pub kind: ActionKind,
}

/// The unmet precondition a suspended action is waiting on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Wait {
    /// A global namespace key that is not yet registered. Keys are all
    /// registered in earlier phases, so at a stall this is a genuine
    /// absence: `CrossReference`.
    Global {
        /// Namespace kind of the key.
        kind: NsKind,
        /// The missing key.
        key: Arc<str>,
    },
    /// A tree-scoped definition that no visible scope provides.
    /// Definitions are registered in an earlier phase, so this too is a
    /// genuine absence: `CrossReference`.
    Definition {
        /// Kind of the missing definition.
        kind: DefKind,
        /// The reference, as written.
        detail: String,
    },
    /// Another context must complete a phase first. At a stall this is a
    /// mutual-await: `Circular`.
    PhaseDone {
        /// The awaited context.
        ctx: ContextId,
        /// The phase it must complete.
        phase: Phase,
    },
    /// Another `type` context's derived type must compose first. At a
    /// stall: `Circular` (typedef chains awaiting each other).
    DerivedReady {
        /// The awaited `type` context.
        ctx: ContextId,
    },
    /// An augment/deviation target path with a missing step. Re-polled
    /// every round, because another augment may yet insert the step.
    TargetPath {
        /// The full target path.
        target: Vec<QName>,
        /// The first step that did not resolve.
        missing: QName,
    },
    /// The deviation barrier: every augment in the session must settle
    /// before any deviation edits the tree.
    AugmentsSettled,
}

/// Result of one action attempt.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// The action finished (possibly having recorded collected errors).
    Done,
    /// The action suspends until the precondition resolves.
    Waiting(Wait),
}

/// Lifecycle of an action within the executor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// Queued for attempt in the current or next round.
    Queued,
    /// Parked on a precondition, with the wait recorded for diagnostics.
    Parked(Wait),
    /// Finished.
    Done,
}
