//! The search driver: pulls labels from the work queue and applies
//! strategies to them until a proof tree can be extracted or time runs out.

use std::time::{Duration, Instant};

use css_core::class::CombinatorialClass;
use css_core::classdb::{AddFlags, ClassDb, ClassFlag};
use css_core::combinator::Combinator;
use css_core::equivdb::EquivDb;
use css_core::label::Label;
use css_core::ruledb::RuleDb;
use css_core::strategy::{StrategyObject, StrategyPack};
use css_tree::ProofTree;

use crate::error::SearchError;
use crate::policy::{AutoSearchConfig, SearchPolicy};
use crate::queue::WorkQueue;
use crate::snapshot::Snapshot;

/// Lightweight per-phase counters, not a full timer table.
///
/// `spec.md` §6 reserves a slot for "accumulated timers"; `SPEC_FULL.md` §2
/// trades that for these plain counts, which are enough to answer "is the
/// search making progress" without pulling in a timing/metrics dependency
/// the core otherwise has no use for.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub labels_popped: u64,
    pub inferral_phases: u64,
    pub initial_phases: u64,
    pub expansion_phases: u64,
    pub rules_added: u64,
    pub equivalences_recorded: u64,
    pub empties_found: u64,
    pub sanity_mismatches: u64,
}

/// The orchestrator: owns the class/equivalence/rule databases, the work
/// queue, and the strategy pack, and drives them through the inferral →
/// initial → expansion phases of `spec.md` §4.5.
pub struct SearchDriver<C: CombinatorialClass> {
    classdb: ClassDb<C>,
    equivdb: EquivDb,
    ruledb: RuleDb,
    queue: WorkQueue,
    pack: StrategyPack<C>,
    policy: SearchPolicy,
    start_label: Label,
    stats: SearchStats,
}

impl<C: CombinatorialClass> SearchDriver<C> {
    /// Register `start` and seed the queue with it.
    pub fn new(start: C, pack: StrategyPack<C>, policy: SearchPolicy) -> Self {
        let mut classdb = ClassDb::new();
        let start_label = classdb.add(
            start,
            AddFlags {
                expandable: true,
                ..AddFlags::default()
            },
        );
        let mut queue = WorkQueue::new();
        queue.add_next(start_label);
        Self {
            classdb,
            equivdb: EquivDb::new(),
            ruledb: RuleDb::new(),
            queue,
            pack,
            policy,
            start_label,
            stats: SearchStats::default(),
        }
    }

    #[must_use]
    pub fn start_label(&self) -> Label {
        self.start_label
    }

    #[must_use]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    #[must_use]
    pub fn classdb(&self) -> &ClassDb<C> {
        &self.classdb
    }

    #[must_use]
    pub fn ruledb(&self) -> &RuleDb {
        &self.ruledb
    }

    #[must_use]
    pub fn equivdb_mut(&mut self) -> &mut EquivDb {
        &mut self.equivdb
    }

    /// Process one label from the queue. Returns `false` once the queue is
    /// fully drained.
    pub fn expand_one(&mut self) -> bool {
        let Some(label) = self.queue.pop() else {
            return false;
        };
        self.stats.labels_popped += 1;

        // A symmetric image is already equivalent to the class that
        // produced it; it carries no independent work (`spec.md` §4.6).
        if self.classdb.is(label, ClassFlag::ExpandingOtherSym) {
            self.queue.ignore(label);
            return true;
        }

        // Retired by an `ignore_parent` strategy object, whichever phase
        // produced it (`spec.md` §4.4: "a label retired by
        // `expanding_children_only` ... is added to ignore"). Screening it
        // here, rather than only at the point `initial_phase` sets the
        // flag, also covers the case where `expanding_children_only` is
        // set mid-expansion-round.
        if self.classdb.is(label, ClassFlag::ExpandingChildrenOnly) {
            self.queue.ignore(label);
            return true;
        }

        if !self.classdb.is(label, ClassFlag::InferralExpanded) {
            self.stats.inferral_phases += 1;
            self.inferral_phase(label);
            self.queue.add_working(label);
            return true;
        }

        if !self.classdb.is(label, ClassFlag::InitialExpanded) {
            self.stats.initial_phases += 1;
            self.initial_phase(label);
            return true;
        }

        if !self.classdb.is_expanded(label, self.pack.rounds()) {
            self.stats.expansion_phases += 1;
            self.expansion_phase(label);
            return true;
        }

        true
    }

    /// Try each inferral strategy once, in pack order, against `label`'s own
    /// class.
    ///
    /// A strategy that returns its own input is a fixed-point failure
    /// (`spec.md` §7): logged and skipped, not fatal. The first strategy
    /// that actually fires unions `label` with the freshly discovered
    /// label and hands the rest of that label's lifecycle to the queue —
    /// the inferred class runs its own inferral/initial/expansion phases
    /// independently rather than resuming this loop mid-rotation. This
    /// keeps the observable contract (explanations still recorded, a fixed
    /// point still terminates the phase) without a bespoke "skip the
    /// strategy that just fired" index.
    fn inferral_phase(&mut self, label: Label) {
        let strategies = self.pack.inferral_strategies.clone();
        for strategy in strategies {
            let class = self.classdb.get_class(label).clone();
            if let Some((inferred, reason)) = strategy.infer(&class) {
                if inferred == class {
                    tracing::warn!(
                        %label,
                        strategy = strategy.name(),
                        "inferral strategy returned its own input; skipping"
                    );
                    continue;
                }
                let new_label = self.classdb.add(inferred, AddFlags::default());
                self.equivdb.union(label, new_label, reason);
                self.stats.equivalences_recorded += 1;
                self.queue.add_working(new_label);
                tracing::debug!(
                    %label,
                    new_label = %new_label,
                    strategy = strategy.name(),
                    "inferral fired"
                );
                break;
            }
        }
        self.classdb.mark(label, ClassFlag::InferralExpanded);
    }

    /// Apply each initial strategy once. Aborts early (and retires the
    /// label) if `expanding_children_only` is set by a strategy object's
    /// `ignore_parent` cleanup.
    fn initial_phase(&mut self, label: Label) {
        let strategies = self.pack.initial_strategies.clone();
        for strategy in strategies {
            let class = self.classdb.get_class(label).clone();
            for object in strategy.decompose(&class) {
                self.route_strategy_object(label, object);
                if self.classdb.is(label, ClassFlag::ExpandingChildrenOnly) {
                    self.classdb.mark(label, ClassFlag::InitialExpanded);
                    self.queue.ignore(label);
                    return;
                }
            }
        }
        self.classdb.mark(label, ClassFlag::InitialExpanded);
        if self.pack.rounds() > 0 {
            self.queue.add_working(label);
        }
    }

    /// Apply the current round's expansion strategies, then advance the
    /// round counter.
    fn expansion_phase(&mut self, label: Label) {
        let round = self.classdb.expansion_round(label) as usize;
        if let Some(strategies) = self.pack.expansion_strategies.get(round).cloned() {
            let class = self.classdb.get_class(label).clone();
            'strategies: for strategy in strategies {
                for object in strategy.decompose(&class) {
                    self.route_strategy_object(label, object);
                    if self.classdb.is(label, ClassFlag::ExpandingChildrenOnly) {
                        break 'strategies;
                    }
                }
            }
        }
        if self.classdb.is(label, ClassFlag::ExpandingChildrenOnly) {
            self.queue.ignore(label);
            return;
        }
        let new_round = self.classdb.advance_expansion_round(label);
        if (new_round as usize) < self.pack.rounds() {
            self.queue.add_working(label);
        }
    }

    /// Register a child class, running symmetry expansion the first time
    /// it is seen.
    fn add_class(&mut self, class: C) -> (Label, bool) {
        let probe = self.classdb.len();
        let label = self.classdb.add(class, AddFlags::default());
        let is_new = self.classdb.len() != probe;
        if is_new {
            self.expand_symmetries(label);
        }
        (label, is_new)
    }

    /// `spec.md` §4.6: map a freshly discovered class under every symmetry;
    /// distinct images are registered as `expanding_other_sym` and unioned
    /// with the class that produced them.
    fn expand_symmetries(&mut self, label: Label) {
        if self.pack.symmetries.is_empty() || self.classdb.is(label, ClassFlag::SymmetryExpanded) {
            return;
        }
        let symmetries = self.pack.symmetries.clone();
        let class = self.classdb.get_class(label).clone();
        for symmetry in symmetries {
            let image = symmetry.apply(&class);
            if image == class {
                continue;
            }
            let image_label = self.classdb.add(
                image,
                AddFlags {
                    expanding_other_sym: true,
                    ..AddFlags::default()
                },
            );
            self.equivdb.union(label, image_label, format!("symmetry: {}", symmetry.name()));
            self.stats.equivalences_recorded += 1;
        }
        self.classdb.mark(label, ClassFlag::SymmetryExpanded);
    }

    /// Decide emptiness the first time it is asked for, per label.
    ///
    /// `spec.md` §4.1's "insert a terminal rule into the rule db" is
    /// realised lazily instead of eagerly here: marking `label`
    /// `strategy_verified` (which `set_empty(true)` already does) is enough
    /// for [`css_tree::rule_dict::build_rule_dict`] to synthesize the
    /// artificial empty-children rule when the tree searcher next runs.
    /// This keeps the class db from needing a reference to the rule db.
    fn ensure_emptiness_decided(&mut self, label: Label) -> bool {
        if let Some(known) = self.classdb.empty(label) {
            return known;
        }
        let empty = self.classdb.get_class(label).is_empty();
        self.classdb.set_empty(label, empty);
        if empty {
            self.stats.empties_found += 1;
        }
        empty
    }

    /// `spec.md` §4.5 `_strategy_cleanup` plus the post-cleanup routing
    /// decision.
    fn route_strategy_object(&mut self, parent: Label, object: StrategyObject<C>) {
        let mut resolved = Vec::with_capacity(object.children.len());
        for child in object.children {
            let (label, is_new) = self.add_class(child.class);
            if is_new {
                self.queue.add_next(label);
            }
            if child.inferable {
                self.queue.add_working(label);
            }
            // An already-empty child is not a candidate for verification:
            // `spec.md` §9's open question is resolved by keeping the
            // source's short-circuit, since a class with no objects has
            // nothing left for a verification strategy to recognise.
            let empty = self.ensure_emptiness_decided(label);
            if !empty {
                if child.workable {
                    self.classdb.mark(label, ClassFlag::Expandable);
                }
                self.try_verify(label);
            }
            resolved.push((label, empty));
        }

        let non_empty: Vec<Label> = resolved.iter().filter(|(_, e)| !e).map(|(l, _)| *l).collect();
        let any_empty = resolved.iter().any(|(_, e)| *e);

        if non_empty.is_empty() {
            self.classdb.set_empty(parent, true);
            self.stats.empties_found += 1;
        } else if non_empty.len() == 1 && !self.pack.forward_equivalence && !object.forward_equivalence {
            let mut reason = object.formal_step.clone();
            if any_empty {
                reason.push_str(" (some children recognised empty and dropped)");
            }
            self.equivdb.union(parent, non_empty[0], reason);
            self.stats.equivalences_recorded += 1;
        } else {
            self.try_add_rule(parent, non_empty, object.formal_step, object.constructor);
        }

        if object.ignore_parent
            && resolved
                .iter()
                .all(|(label, _)| self.classdb.is(*label, ClassFlag::Expandable))
        {
            self.classdb.mark(parent, ClassFlag::ExpandingChildrenOnly);
        }
    }

    fn try_add_rule(&mut self, parent: Label, children: Vec<Label>, step: String, combinator: Combinator) {
        if let Some(length) = self.policy.sanity_check_length {
            if let Some(mismatch) = self.sanity_check_rule(parent, &children, combinator, length) {
                tracing::warn!(
                    %parent,
                    expected = mismatch.0,
                    actual = mismatch.1,
                    "rule failed its sanity check at length {length}; inserting anyway"
                );
                self.stats.sanity_mismatches += 1;
            }
        }
        self.ruledb.add(parent, children, step, combinator);
        self.stats.rules_added += 1;
    }

    /// A lightweight, single-rule counting check — not the full
    /// proof-tree-wide [`css_tree::proof_tree::ProofTree::sanity_check`],
    /// which only runs over an already-extracted tree. Returns
    /// `Some((expected, actual))` on mismatch.
    fn sanity_check_rule(
        &self,
        parent: Label,
        children: &[Label],
        combinator: Combinator,
        length: usize,
    ) -> Option<(u64, u64)> {
        let expected = self.classdb.get_class(parent).objects_of_length(length).len() as u64;
        let actual = match combinator {
            Combinator::Disjoint => children
                .iter()
                .map(|&c| self.classdb.get_class(c).objects_of_length(length).len() as u64)
                .sum(),
            Combinator::Cartesian => css_tree::counting::compositions(length, children.len())
                .into_iter()
                .map(|parts| {
                    children
                        .iter()
                        .zip(parts.iter())
                        .map(|(&c, &part)| self.classdb.get_class(c).objects_of_length(part).len() as u64)
                        .product::<u64>()
                })
                .sum(),
        };
        if expected == actual {
            None
        } else {
            Some((expected, actual))
        }
    }

    fn try_verify(&mut self, label: Label) {
        if self.equivdb.is_verified(label) {
            return;
        }
        let strategies = self.pack.verification_strategies.clone();
        for strategy in strategies {
            if let Some(reason) = strategy.verify(self.classdb.get_class(label)) {
                self.classdb.mark_strategy_verified(label, reason);
                self.equivdb.update_verified(label);
                return;
            }
        }
    }

    /// Attempt to extract a proof tree from the search state as it stands,
    /// without expanding anything further.
    pub fn find_tree(&mut self) -> Option<ProofTree> {
        css_tree::find_tree(
            self.start_label,
            &self.ruledb,
            &self.classdb,
            &mut self.equivdb,
            self.pack.iterative,
        )
    }

    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.queue.is_drained()
    }

    /// `spec.md` §4.8: expand for a growing time budget, trying `find_tree`
    /// after each round, until a tree is found, `max_time` is exceeded, or
    /// the queue drains.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidCap`] if `config.cap <= 1.0`.
    pub fn auto_search(&mut self, config: &AutoSearchConfig) -> Result<Option<ProofTree>, SearchError> {
        config.validate()?;
        let started = Instant::now();
        let mut budget = config.initial_budget.min(config.hard_cap);

        loop {
            let deadline = Instant::now() + budget;
            while Instant::now() < deadline {
                if !self.expand_one() {
                    break;
                }
            }

            if let Some(tree) = self.find_tree() {
                return Ok(Some(tree));
            }
            if self.is_drained() {
                return Ok(None);
            }
            if started.elapsed() >= config.max_time {
                return Ok(None);
            }

            let grown = budget.as_secs_f64() * config.cap;
            budget = Duration::from_secs_f64(grown).min(config.hard_cap);
        }
    }

    /// Capture everything except the strategy pack (`spec.md` §6).
    pub fn to_snapshot(&self) -> Snapshot<C> {
        Snapshot {
            classdb: self.classdb.to_snapshot(),
            equivdb: self.equivdb.to_snapshot(),
            ruledb: self.ruledb.to_snapshot(),
            queue: self.queue.to_snapshot(),
            start_label: self.start_label,
            iterative: self.pack.iterative,
            forward_equivalence: self.pack.forward_equivalence,
        }
    }

    /// Rebuild a driver from a snapshot plus a freshly supplied strategy
    /// pack (the caller's responsibility — see [`Snapshot`]).
    pub fn from_snapshot(snapshot: Snapshot<C>, pack: StrategyPack<C>, policy: SearchPolicy) -> Self {
        Self {
            classdb: ClassDb::from_snapshot(snapshot.classdb),
            equivdb: EquivDb::from_snapshot(snapshot.equivdb),
            ruledb: RuleDb::from_snapshot(snapshot.ruledb),
            queue: WorkQueue::from_snapshot(snapshot.queue),
            pack,
            policy,
            start_label: snapshot.start_label,
            stats: SearchStats::default(),
        }
    }
}
