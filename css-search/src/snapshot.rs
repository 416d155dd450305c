//! Pause/resume support (`spec.md` §6 "Snapshot format").
//!
//! The strategy pack itself is not captured here: it is made of trait
//! objects (`Arc<dyn Strategy<C>>` and friends), which carry no stable
//! serializable identity in this crate's design. `spec.md` §6 reserves
//! `strategy_generators`/`initial_strategies`/… keys for a module+function
//! reference the caller resolves on their own; callers that need pause/
//! resume are expected to reconstruct the same [`css_core::strategy::StrategyPack`]
//! from their own registry and pass it back into
//! [`crate::driver::SearchDriver::from_snapshot`] alongside this structure.
//! Everything that *is* plain data — the three core databases, the queue,
//! and the start label — round-trips exactly.

use serde::{Deserialize, Serialize};

use css_core::class::CombinatorialClass;
use css_core::classdb::ClassDbSnapshot;
use css_core::equivdb::EquivDbSnapshot;
use css_core::label::Label;
use css_core::ruledb::RuleDbSnapshot;

use crate::queue::WorkQueueSnapshot;

/// A serializable snapshot of everything in a [`crate::driver::SearchDriver`]
/// except the strategy pack.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot<C> {
    pub classdb: ClassDbSnapshot<C>,
    pub equivdb: EquivDbSnapshot,
    pub ruledb: RuleDbSnapshot,
    pub queue: WorkQueueSnapshot,
    pub start_label: Label,
    pub iterative: bool,
    pub forward_equivalence: bool,
}

impl<C: CombinatorialClass> Snapshot<C> {
    #[must_use]
    pub fn start_label(&self) -> Label {
        self.start_label
    }
}
