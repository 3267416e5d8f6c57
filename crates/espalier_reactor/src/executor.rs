//! The phase executor: lockstep phases, iterative rounds, stall
//! detection.
//!
//! All state of one fixpoint computation lives in [`Build`]. Within a
//! phase the executor sweeps a FIFO action queue round by round; actions
//! complete or suspend on preconditions, and resolving a precondition
//! releases its waiters into the next round. A full round with zero
//! progress while work remains is a stall, classified per stuck action
//! and reported as one aggregated failure. Termination is guaranteed by
//! bounded rounds: a round either makes progress or ends the build.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use espalier_foundation::{BuildFailure, Error, QName, SourceRef};
use espalier_source::Source;
use espalier_vocab::{Keyword, PrefixScope, Vocabulary};

use crate::action::{Action, ActionId, ActionKind, Outcome, Status, Wait};
use crate::config::ReactorLimits;
use crate::context::{ContextArena, ContextId};
use crate::namespace::{GlobalNamespaces, NsKind};
use crate::phase::Phase;

/// Per-source linkage state: names, prefix table, include order.
#[derive(Debug)]
pub(crate) struct SourceInfo {
    /// Root context of the source.
    pub root: ContextId,
    /// Name of a module, or of the parent module for a linked submodule;
    /// what unprefixed references resolve to.
    pub declared_name: Arc<str>,
    /// True for submodule roots.
    pub submodule: bool,
    /// The owning module of a submodule, once `belongs-to` links.
    pub parent_module: Option<Arc<str>>,
    /// Prefix -> module-name bindings for this source.
    pub prefixes: HashMap<Arc<str>, Arc<str>>,
    /// Included submodule names, in declared order.
    pub includes: Vec<Arc<str>>,
}

/// [`PrefixScope`] view of one source's linkage state.
pub(crate) struct SourcePrefixes<'a> {
    info: &'a SourceInfo,
}

impl PrefixScope for SourcePrefixes<'_> {
    fn resolve(&self, prefix: Option<&str>) -> Option<Arc<str>> {
        match prefix {
            None => {
                if self.info.submodule {
                    self.info
                        .parent_module
                        .clone()
                        .or_else(|| Some(Arc::clone(&self.info.declared_name)))
                } else {
                    Some(Arc::clone(&self.info.declared_name))
                }
            }
            Some(prefix) => self.info.prefixes.get(prefix).cloned(),
        }
    }
}

/// All mutable state of one fixpoint computation.
pub(crate) struct Build<'v> {
    pub vocab: &'v Vocabulary,
    limits: ReactorLimits,
    pub arena: ContextArena,
    pub globals: GlobalNamespaces,
    pub sources: Vec<SourceInfo>,
    pub errors: Vec<Error>,

    actions: Vec<Action>,
    status: Vec<Status>,
    queue: VecDeque<ActionId>,
    /// Actions re-polled every round (augment target paths).
    polled: Vec<ActionId>,
    phase_waiters: Vec<(ContextId, Phase, ActionId)>,
    derived_waiters: HashMap<ContextId, Vec<ActionId>>,
    /// Pending actions per anchor; a context completes a phase only when
    /// its whole subtree has none.
    unfinished: HashMap<ContextId, u32>,
    /// `type` contexts already scheduled for composition this build.
    types_scheduled: HashSet<ContextId>,

    pub augments_pending: u32,
    augments_settled: bool,
}

impl<'v> Build<'v> {
    pub fn new(vocab: &'v Vocabulary, limits: ReactorLimits) -> Self {
        Self {
            vocab,
            limits,
            arena: ContextArena::new(),
            globals: GlobalNamespaces::new(),
            sources: Vec::new(),
            errors: Vec::new(),
            actions: Vec::new(),
            status: Vec::new(),
            queue: VecDeque::new(),
            polled: Vec::new(),
            phase_waiters: Vec::new(),
            derived_waiters: HashMap::new(),
            unfinished: HashMap::new(),
            types_scheduled: HashSet::new(),
            augments_pending: 0,
            augments_settled: false,
        }
    }

    /// Loads a source into the arena, before any phase runs.
    pub fn add_source(&mut self, source: &Source) {
        let index = self.sources.len();
        let root = self.arena.load(source, index);
        let declared_name = Arc::clone(&self.arena.node(root).module);
        self.sources.push(SourceInfo {
            root,
            declared_name,
            submodule: self.arena.node(root).keyword == Keyword::Submodule,
            parent_module: None,
            prefixes: HashMap::new(),
            includes: Vec::new(),
        });
    }

    /// Drives every phase up to and including `target`.
    ///
    /// # Errors
    ///
    /// Returns every error collected once the failing phase has finished
    /// sweeping all sources; no partial result survives a failure.
    pub fn run(&mut self, target: Phase) -> Result<(), BuildFailure> {
        for phase in Phase::ALL {
            if phase > target {
                break;
            }
            self.schedule_phase(phase);
            self.run_phase(phase);
            if !self.errors.is_empty() {
                return Err(BuildFailure::new(std::mem::take(&mut self.errors)));
            }
            // Everything settled: the whole forest completed the phase.
            for id in self.arena.ids() {
                self.arena.node_mut(id).completed = Some(phase);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------

    pub fn schedule(&mut self, kind: ActionKind, anchor: ContextId) -> ActionId {
        #[allow(clippy::cast_possible_truncation)]
        let id = ActionId(self.actions.len() as u32);
        self.actions.push(Action { anchor, kind });
        self.status.push(Status::Queued);
        self.queue.push_back(id);
        *self.unfinished.entry(anchor).or_insert(0) += 1;
        id
    }

    fn schedule_phase(&mut self, phase: Phase) {
        match phase {
            Phase::SourcePreLinkage => {
                for index in 0..self.sources.len() {
                    let root = self.sources[index].root;
                    self.schedule(ActionKind::RegisterSource, root);
                }
            }
            Phase::SourceLinkage => {
                for index in 0..self.sources.len() {
                    let root = self.sources[index].root;
                    self.schedule(ActionKind::LinkSource, root);
                }
            }
            Phase::StatementDefinition => {
                let ids: Vec<ContextId> = self.arena.ids().collect();
                for id in ids {
                    self.schedule(ActionKind::DefineStatement, id);
                }
            }
            Phase::FullDeclaration => {
                let ids: Vec<ContextId> = self.arena.ids().collect();
                for id in ids {
                    let keyword = self.arena.node(id).keyword.clone();
                    if keyword == Keyword::Uses && !self.arena.node(id).expanded {
                        self.schedule(ActionKind::ExpandUses, id);
                    } else if keyword == Keyword::Identity
                        && self.arena.child_by_keyword(id, &Keyword::Base).is_some()
                    {
                        self.schedule(ActionKind::ResolveIdentity, id);
                    }
                }
            }
            Phase::EffectiveModel => {
                let ids: Vec<ContextId> = self.arena.ids().collect();
                for id in ids {
                    let keyword = self.arena.node(id).keyword.clone();
                    if keyword == Keyword::Type && self.arena.node(id).derived.is_none() {
                        self.schedule_type(id);
                    } else if keyword == Keyword::Augment {
                        self.augments_pending += 1;
                        self.schedule(ActionKind::ApplyAugment, id);
                    } else if keyword == Keyword::Deviation {
                        self.schedule(ActionKind::ApplyDeviation, id);
                    }
                }
            }
        }
    }

    /// Schedules composition for a `type` context exactly once.
    pub fn schedule_type(&mut self, id: ContextId) {
        if self.types_scheduled.insert(id) {
            self.schedule(ActionKind::ComposeType, id);
        }
    }

    /// Schedules composition for every unresolved `type` in a freshly
    /// copied subtree (augment insertions, deviate type replacements).
    pub fn schedule_types_in(&mut self, root: ContextId) {
        for id in self.arena.subtree(root) {
            let node = self.arena.node(id);
            if node.keyword == Keyword::Type && node.derived.is_none() {
                self.schedule_type(id);
            }
        }
    }

    // ------------------------------------------------------------------
    // The round loop
    // ------------------------------------------------------------------

    fn run_phase(&mut self, phase: Phase) {
        let mut rounds = 0u32;
        loop {
            // Release polled actions for their per-round re-attempt.
            for id in std::mem::take(&mut self.polled) {
                self.wake(id);
            }
            if self.queue.is_empty() && !self.has_parked() {
                break;
            }
            rounds += 1;
            if rounds > self.limits.max_rounds {
                self.errors.push(Error::limit(format!(
                    "phase {phase} exceeded {} resolution rounds",
                    self.limits.max_rounds
                )));
                break;
            }

            let contexts_before = self.arena.len();
            let mut progress = false;
            let budget = self.queue.len();
            for _ in 0..budget {
                let Some(id) = self.queue.pop_front() else {
                    break;
                };
                if self.status[id.index()] != Status::Queued {
                    continue;
                }
                match self.attempt(id) {
                    Outcome::Done => {
                        self.finish(id);
                        progress = true;
                    }
                    Outcome::Waiting(wait) => self.park(id, wait),
                }
            }
            progress |= self.arena.len() > contexts_before;
            progress |= self.propagate_completion(phase);

            if phase == Phase::EffectiveModel && !self.augments_settled && self.augments_pending == 0
            {
                self.augments_settled = true;
                let waiters: Vec<ActionId> = self
                    .status
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| matches!(s, Status::Parked(Wait::AugmentsSettled)))
                    .map(|(i, _)| {
                        #[allow(clippy::cast_possible_truncation)]
                        ActionId(i as u32)
                    })
                    .collect();
                for id in waiters {
                    self.wake(id);
                    progress = true;
                }
            }

            if !progress {
                if self.queue.is_empty() && !self.has_parked() {
                    break;
                }
                self.report_stall();
                break;
            }
        }
    }

    fn attempt(&mut self, id: ActionId) -> Outcome {
        let Action { anchor, kind } = self.actions[id.index()].clone();
        match kind {
            ActionKind::RegisterSource => self.register_source(anchor),
            ActionKind::LinkSource => self.link_source(id, anchor),
            ActionKind::DefineStatement => self.define_statement(anchor),
            ActionKind::ExpandUses => self.expand_uses(anchor),
            ActionKind::ResolveIdentity => self.resolve_identity(anchor),
            ActionKind::ComposeType => self.compose_type(id, anchor),
            ActionKind::ApplyAugment => self.apply_augment(anchor),
            ActionKind::ApplyDeviation => self.apply_deviation(anchor),
        }
    }

    fn finish(&mut self, id: ActionId) {
        self.status[id.index()] = Status::Done;
        let anchor = self.actions[id.index()].anchor;
        if let Some(count) = self.unfinished.get_mut(&anchor) {
            *count = count.saturating_sub(1);
        }
        if self.actions[id.index()].kind == ActionKind::ApplyAugment {
            self.augments_pending = self.augments_pending.saturating_sub(1);
        }
    }

    fn park(&mut self, id: ActionId, wait: Wait) {
        match &wait {
            Wait::Global { kind, key } => {
                self.globals.park(*kind, Arc::clone(key), id);
            }
            Wait::PhaseDone { ctx, phase } => {
                self.phase_waiters.push((*ctx, *phase, id));
            }
            Wait::DerivedReady { ctx } => {
                self.derived_waiters.entry(*ctx).or_default().push(id);
            }
            Wait::TargetPath { .. } => {
                // The target tree changes as other augments land; poll.
                self.polled.push(id);
            }
            Wait::Definition { .. } | Wait::AugmentsSettled => {}
        }
        self.status[id.index()] = Status::Parked(wait);
    }

    /// Releases a parked action back into the queue.
    pub fn wake(&mut self, id: ActionId) {
        if matches!(self.status[id.index()], Status::Parked(_)) {
            self.status[id.index()] = Status::Queued;
            self.queue.push_back(id);
        }
    }

    pub fn wake_all(&mut self, ids: Vec<ActionId>) {
        for id in ids {
            self.wake(id);
        }
    }

    /// Called when a `type` context's derived type lands.
    pub fn wake_derived(&mut self, ctx: ContextId) {
        if let Some(waiters) = self.derived_waiters.remove(&ctx) {
            self.wake_all(waiters);
        }
    }

    fn has_parked(&self) -> bool {
        self.status.iter().any(|s| matches!(s, Status::Parked(_)))
    }

    /// Leaf-to-root completion sweep: a context completes the phase when
    /// no pending action anchors to it and all its children completed.
    /// Completions wake phase waiters for the next round.
    fn propagate_completion(&mut self, phase: Phase) -> bool {
        let mut progress = false;
        let ids: Vec<ContextId> = self.arena.ids().collect();
        // Children always carry higher ids than their parents.
        for &id in ids.iter().rev() {
            if self.arena.node(id).reached(phase) {
                continue;
            }
            let anchored = self.unfinished.get(&id).copied().unwrap_or(0);
            if anchored > 0 {
                continue;
            }
            let children_done = self
                .arena
                .node(id)
                .children
                .iter()
                .all(|&c| self.arena.node(c).reached(phase));
            if children_done {
                self.arena.node_mut(id).completed = Some(phase);
                progress = true;
            }
        }
        // Wake waiters whose awaited context has now completed.
        let mut still_waiting = Vec::new();
        let waiters = std::mem::take(&mut self.phase_waiters);
        for (ctx, awaited, id) in waiters {
            if self.arena.node(ctx).reached(awaited) {
                self.wake(id);
                progress = true;
            } else {
                still_waiting.push((ctx, awaited, id));
            }
        }
        self.phase_waiters = still_waiting;
        progress
    }

    // ------------------------------------------------------------------
    // Stall classification
    // ------------------------------------------------------------------

    /// Classifies and reports every stuck action: `CrossReference` for
    /// genuine absences, `Circular` for mutual awaits, with the
    /// augment-feeds-augment refinement for target paths.
    fn report_stall(&mut self) {
        let stuck: Vec<(ActionId, Wait)> = self
            .status
            .iter()
            .enumerate()
            .filter_map(|(i, s)| match s {
                Status::Parked(wait) => {
                    #[allow(clippy::cast_possible_truncation)]
                    Some((ActionId(i as u32), wait.clone()))
                }
                _ => None,
            })
            .collect();

        for (id, wait) in &stuck {
            let anchor = self.actions[id.index()].anchor;
            let at = self.arena.node(anchor).at.clone();
            let error = match wait {
                Wait::Global { kind, key } => Some(
                    Error::cross_reference(format!("{kind} \"{key}\" does not exist in any source"))
                        .at(at),
                ),
                Wait::Definition { detail, .. } => {
                    Some(Error::cross_reference(detail.clone()).at(at))
                }
                Wait::PhaseDone { ctx, .. } => {
                    let awaited = self.arena.node(*ctx);
                    Some(
                        Error::circular(format!(
                            "\"{} {}\" awaits \"{} {}\", which never completes",
                            self.arena.node(anchor).keyword,
                            self.arena.node(anchor).name().map_or("", |n| n.as_ref()),
                            awaited.keyword,
                            awaited.name().map_or("", |n| n.as_ref()),
                        ))
                        .at(at)
                        .also(awaited.at.clone()),
                    )
                }
                Wait::DerivedReady { ctx } => {
                    let awaited = self.arena.node(*ctx);
                    Some(
                        Error::circular(format!(
                            "type \"{}\" awaits type \"{}\", which never composes",
                            self.arena.node(anchor).raw.as_deref().unwrap_or("?"),
                            awaited.raw.as_deref().unwrap_or("?"),
                        ))
                        .at(at)
                        .also(awaited.at.clone()),
                    )
                }
                Wait::TargetPath { target, missing } => {
                    Some(self.classify_target_stall(*id, target, missing, at))
                }
                // Deviations parked behind stuck augments are victims,
                // not causes; the augments themselves get reported.
                Wait::AugmentsSettled => None,
            };
            if let Some(error) = error {
                self.errors.push(error);
            }
        }
    }

    /// A stuck augment whose missing step would be produced by another
    /// stuck augment is a cycle; otherwise the target simply never
    /// exists.
    fn classify_target_stall(
        &self,
        id: ActionId,
        target: &[QName],
        missing: &QName,
        at: SourceRef,
    ) -> Error {
        let missing_index = target.iter().position(|s| s == missing).unwrap_or(0);
        let needed_prefix = &target[..missing_index];

        for (other_index, status) in self.status.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let other_id = ActionId(other_index as u32);
            if other_id == id || !matches!(status, Status::Parked(Wait::TargetPath { .. })) {
                continue;
            }
            let other = &self.actions[other_id.index()];
            if other.kind != ActionKind::ApplyAugment {
                continue;
            }
            let Some(espalier_foundation::Arg::NodeId(other_target)) =
                &self.arena.node(other.anchor).resolved
            else {
                continue;
            };
            let inserts_missing = other_target.as_slice() == needed_prefix
                && self
                    .arena
                    .node(other.anchor)
                    .children
                    .iter()
                    .any(|&c| self.arena.node(c).name() == Some(missing.name()));
            if inserts_missing {
                return Error::circular(format!(
                    "augment of \"{}\" awaits step \"{missing}\" produced by another stuck augment",
                    display_path(target)
                ))
                .at(at)
                .also(self.arena.node(other.anchor).at.clone());
            }
        }
        Error::cross_reference(format!(
            "augment target \"{}\" has no step \"{missing}\" in any source",
            display_path(target)
        ))
        .at(at)
    }

    // ------------------------------------------------------------------
    // Shared helpers for action implementations
    // ------------------------------------------------------------------

    /// Records a collected error, attaching the context's location if the
    /// error does not carry one yet.
    pub fn collect(&mut self, error: Error, ctx: ContextId) {
        let error = if error.at.is_none() {
            error.at(self.arena.node(ctx).at.clone())
        } else {
            error
        };
        self.errors.push(error);
    }

    /// The linkage state of the source a context was loaded from.
    pub fn source_of(&self, ctx: ContextId) -> &SourceInfo {
        &self.sources[self.arena.node(ctx).source]
    }

    /// Prefix scope for argument parsing within a context's source.
    pub fn prefixes_of(&self, ctx: ContextId) -> SourcePrefixes<'_> {
        SourcePrefixes {
            info: self.source_of(ctx),
        }
    }

    /// The root context of the named module (never a submodule).
    pub fn module_root(&self, name: &str) -> Option<ContextId> {
        self.globals.lookup(NsKind::Module, name)
    }

    /// The top-level contexts of a module's data scope: its own children
    /// followed by each included submodule's, in include order.
    pub fn module_scope_children(&self, module_root: ContextId) -> Vec<ContextId> {
        let mut children = self.arena.node(module_root).children.clone();
        let info = &self.sources[self.arena.node(module_root).source];
        for include in &info.includes {
            if let Some(sub_root) = self.globals.lookup(NsKind::Submodule, include) {
                children.extend(self.arena.node(sub_root).children.iter().copied());
            }
        }
        children
    }

    /// Walks an absolute schema-node-id through the context forest.
    ///
    /// `Err(None)` when the module of the first step is unknown;
    /// `Err(Some(step))` naming the first step that does not resolve.
    pub fn navigate_target(&self, steps: &[QName]) -> Result<ContextId, Option<QName>> {
        let first = steps.first().ok_or(None)?;
        let module_root = self.module_root(first.module()).ok_or(None)?;
        let mut children = self.module_scope_children(module_root);
        let mut current = None;
        for step in steps {
            let found = children.iter().copied().find(|&c| {
                let node = self.arena.node(c);
                node.supported
                    && self.vocab.is_data_node(&node.keyword)
                    && node.module == *step.module()
                    && node.name() == Some(step.name())
            });
            match found {
                Some(c) => {
                    current = Some(c);
                    children = self.arena.node(c).children.clone();
                }
                None => return Err(Some(step.clone())),
            }
        }
        current.ok_or(None)
    }

    /// True once the deviation barrier has lifted.
    pub fn augments_settled(&self) -> bool {
        self.augments_settled
    }
}

/// Formats a target path the way it was written.
pub(crate) fn display_path(steps: &[QName]) -> String {
    let mut text = String::new();
    for step in steps {
        text.push('/');
        text.push_str(&step.to_string());
    }
    text
}
