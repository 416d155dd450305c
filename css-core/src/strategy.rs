//! Strategy function signatures and the strategy pack.
//!
//! `spec.md` §6 specifies strategies only through their interface: a
//! function from a class to zero or more decompositions. Rather than a
//! class hierarchy (the source pattern this crate deliberately does not
//! copy — see DESIGN.md), a strategy here is a tagged capability: each kind
//! (expansion, inferral, verification, symmetry) gets its own trait with a
//! signature that makes the corresponding misuse case unrepresentable
//! (an inferral strategy simply cannot return more than one child, because
//! its return type has no slot for a tuple of children).

use crate::combinator::Combinator;

/// A single child produced by an expansion strategy, with the per-child
/// capability flags `spec.md` §4.5 attaches to strategy objects.
#[derive(Debug, Clone)]
pub struct ChildSpec<C> {
    /// The child class.
    pub class: C,
    /// Whether this child should be pushed to the working tier for
    /// immediate (re-)expansion rather than waiting for the next level.
    pub inferable: bool,
    /// Whether this child is itself a candidate for further expansion
    /// (sets `expandable` on its class record).
    pub workable: bool,
}

impl<C> ChildSpec<C> {
    /// Construct a child spec with both flags set (the common case).
    #[must_use]
    pub fn new(class: C) -> Self {
        Self {
            class,
            inferable: true,
            workable: true,
        }
    }

    /// Builder: override `inferable`.
    #[must_use]
    pub fn inferable(mut self, value: bool) -> Self {
        self.inferable = value;
        self
    }

    /// Builder: override `workable`.
    #[must_use]
    pub fn workable(mut self, value: bool) -> Self {
        self.workable = value;
        self
    }
}

/// One decomposition of a class into children, as produced by an expansion
/// strategy.
#[derive(Debug, Clone)]
pub struct StrategyObject<C> {
    /// The children this decomposition produces.
    pub children: Vec<ChildSpec<C>>,
    /// Human-readable reason, propagated onto whatever rule/equivalence this
    /// decomposition becomes.
    pub formal_step: String,
    /// How the children combine to count the parent.
    pub constructor: Combinator,
    /// If set and every child turns out to be expandable, the parent is
    /// retired (`expanding_children_only`) rather than re-queued.
    pub ignore_parent: bool,
    /// If set, a single-child decomposition is still stored as a rule in
    /// the rule db rather than folded into the equivalence db.
    pub forward_equivalence: bool,
}

impl<C> StrategyObject<C> {
    /// Construct a strategy object with `ignore_parent`/`forward_equivalence`
    /// left at their common defaults (`false`).
    #[must_use]
    pub fn new(
        children: Vec<ChildSpec<C>>,
        formal_step: impl Into<String>,
        constructor: Combinator,
    ) -> Self {
        Self {
            children,
            formal_step: formal_step.into(),
            constructor,
            ignore_parent: false,
            forward_equivalence: false,
        }
    }
}

/// An expansion (or initial) strategy: a class decomposes into zero or more
/// alternative child tuples.
pub trait Strategy<C>: Send + Sync {
    /// Attempt to decompose `class`. An empty vector means the strategy does
    /// not apply.
    fn decompose(&self, class: &C) -> Vec<StrategyObject<C>>;

    /// A short name used in diagnostics and in the rotating inferral order.
    fn name(&self) -> &str;
}

/// An inferral strategy: a class maps to a single, possibly-simplified,
/// equivalent class. Returning `None` means the strategy does not apply.
///
/// The single-child nature of inferral makes "attempting to infer with a
/// multi-child rule" (a `spec.md` §7 misuse case) impossible to express: the
/// return type has room for exactly one class.
pub trait InferralStrategy<C>: Send + Sync {
    /// Attempt to infer a replacement for `class`, with the formal step
    /// explaining the equivalence.
    fn infer(&self, class: &C) -> Option<(C, String)>;

    /// A short name used in diagnostics and in the rotating inferral order.
    fn name(&self) -> &str;
}

/// A verification strategy: decides whether a class is already fully
/// understood (its enumeration is known by other means).
pub trait VerificationStrategy<C>: Send + Sync {
    /// Attempt to verify `class`, returning the formal step if successful.
    fn verify(&self, class: &C) -> Option<String>;

    /// A short name used in diagnostics.
    fn name(&self) -> &str;
}

/// A symmetry: a structure-preserving map from a class to another class
/// with the same enumeration.
pub trait Symmetry<C>: Send + Sync {
    /// Map `class` under this symmetry.
    fn apply(&self, class: &C) -> C;

    /// A short name used in diagnostics.
    fn name(&self) -> &str;
}

/// The full set of strategies the search driver consults.
///
/// Expansion strategies are grouped into ordered rounds: round `i` is tried
/// on a label only after `i` prior rounds have each been exhausted once
/// (`spec.md` §4.5 "Expansion round r").
pub struct StrategyPack<C> {
    pub initial_strategies: Vec<std::sync::Arc<dyn Strategy<C>>>,
    pub expansion_strategies: Vec<Vec<std::sync::Arc<dyn Strategy<C>>>>,
    pub inferral_strategies: Vec<std::sync::Arc<dyn InferralStrategy<C>>>,
    pub verification_strategies: Vec<std::sync::Arc<dyn VerificationStrategy<C>>>,
    /// Selects `iterative_prune` in the tree searcher (strict DAG
    /// specification, no back-edge re-introduction during pruning).
    pub iterative: bool,
    /// If set, single-child expansion rules are stored in the rule db
    /// rather than folded into the equivalence db, even when the producing
    /// strategy object doesn't itself request it.
    pub forward_equivalence: bool,
    pub symmetries: Vec<std::sync::Arc<dyn Symmetry<C>>>,
}

impl<C> StrategyPack<C> {
    /// Number of expansion rounds in this pack.
    #[must_use]
    pub fn rounds(&self) -> usize {
        self.expansion_strategies.len()
    }
}

impl<C> Default for StrategyPack<C> {
    fn default() -> Self {
        Self {
            initial_strategies: Vec::new(),
            expansion_strategies: Vec::new(),
            inferral_strategies: Vec::new(),
            verification_strategies: Vec::new(),
            iterative: false,
            forward_equivalence: false,
            symmetries: Vec::new(),
        }
    }
}
