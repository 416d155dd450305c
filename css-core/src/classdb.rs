//! Canonical labelling and per-label metadata for combinatorial classes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::class::CombinatorialClass;
use crate::label::{Label, LabelAllocator};

/// One of the boolean/tri-state flags tracked per label.
///
/// `spec.md` §4.1 asks for `mark(label, flag)` / `is(label, flag)`
/// generically "for each metadata flag"; this enum is that generic
/// dispatch key. `Empty` and `StrategyVerified` are read-only through this
/// API — they are set through [`ClassDb::set_empty`] and
/// [`ClassDb::mark_strategy_verified`] because they carry side data
/// (the tri-state value, and the verification reason).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassFlag {
    Expandable,
    InferralExpanded,
    InitialExpanded,
    SymmetryExpanded,
    ExpandingOtherSym,
    ExpandingChildrenOnly,
}

/// Flags that may be supplied at [`ClassDb::add`] time.
///
/// Only `expandable` and `expanding_other_sym` are meaningful to set at
/// creation per `spec.md` §4.1/§4.6; the remaining flags are one-shot and
/// toggled later via [`ClassDb::mark`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AddFlags {
    pub expandable: bool,
    pub expanding_other_sym: bool,
}

/// Per-label metadata record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRecord {
    pub expandable: bool,
    pub inferral_expanded: bool,
    pub initial_expanded: bool,
    pub expansion_round: u32,
    pub symmetry_expanded: bool,
    pub expanding_other_sym: bool,
    pub expanding_children_only: bool,
    /// Tri-state emptiness: `None` = unknown, `Some(v)` = decided.
    pub empty: Option<bool>,
    pub strategy_verified: bool,
    pub verification_reason: Option<String>,
}

impl Default for ClassRecord {
    fn default() -> Self {
        Self {
            expandable: false,
            inferral_expanded: false,
            initial_expanded: false,
            expansion_round: 0,
            symmetry_expanded: false,
            expanding_other_sym: false,
            expanding_children_only: false,
            empty: None,
            strategy_verified: false,
            verification_reason: None,
        }
    }
}

impl ClassRecord {
    fn apply_add_flags(&mut self, flags: AddFlags) {
        // Monotone upgrade only: a flag that is already set stays set.
        self.expandable |= flags.expandable;
        self.expanding_other_sym |= flags.expanding_other_sym;
    }
}

/// Canonical class labelling plus per-label metadata.
///
/// Classes are interned by `(Hash, Eq)` (`spec.md` §9 design note: "prefer
/// an interning table ... producing dense integer labels rather than
/// storing class objects as map keys directly" — here the map key *is* the
/// class, wrapped in `Arc` for cheap sharing, which gives the same
/// cache-friendly dense-label behaviour downstream).
pub struct ClassDb<C: CombinatorialClass> {
    classes: Vec<Arc<C>>,
    index: HashMap<Arc<C>, Label>,
    records: Vec<ClassRecord>,
    allocator: LabelAllocator,
}

impl<C: CombinatorialClass> Default for ClassDb<C> {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            index: HashMap::new(),
            records: Vec::new(),
            allocator: LabelAllocator::default(),
        }
    }
}

impl<C: CombinatorialClass> ClassDb<C> {
    /// Create an empty class database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `class`, returning its label.
    ///
    /// If the class is already known, only a monotone upgrade of `flags` is
    /// applied to the existing record (already-set flags are never
    /// cleared); no new label is allocated.
    pub fn add(&mut self, class: C, flags: AddFlags) -> Label {
        let class = Arc::new(class);
        if let Some(&label) = self.index.get(&class) {
            self.records[label.as_u32() as usize].apply_add_flags(flags);
            return label;
        }
        let label = self.allocator.alloc();
        self.index.insert(Arc::clone(&class), label);
        self.classes.push(class);
        let mut record = ClassRecord::default();
        record.apply_add_flags(flags);
        self.records.push(record);
        tracing::trace!(label = %label, "registered new class");
        label
    }

    /// Look up the label for an already-registered class.
    ///
    /// # Panics
    ///
    /// Panics if `class` has never been passed to [`ClassDb::add`] — per
    /// `spec.md` §4.1, the driver always calls `add` before `get_label`, so
    /// reaching this case is a programmer error, not a recoverable one.
    #[must_use]
    pub fn get_label(&self, class: &C) -> Label {
        *self
            .index
            .get(class)
            .expect("get_label called on a class that was never added")
    }

    /// The class a label names.
    ///
    /// # Panics
    ///
    /// Panics on an unknown label — labels are only ever handed out by this
    /// database, so an unknown one indicates a caller mixed up two
    /// databases.
    #[must_use]
    pub fn get_class(&self, label: Label) -> &C {
        &self.classes[label.as_u32() as usize]
    }

    fn record(&self, label: Label) -> &ClassRecord {
        &self.records[label.as_u32() as usize]
    }

    fn record_mut(&mut self, label: Label) -> &mut ClassRecord {
        &mut self.records[label.as_u32() as usize]
    }

    /// Set a one-shot/monotone flag on `label`.
    pub fn mark(&mut self, label: Label, flag: ClassFlag) {
        let record = self.record_mut(label);
        match flag {
            ClassFlag::Expandable => record.expandable = true,
            ClassFlag::InferralExpanded => record.inferral_expanded = true,
            ClassFlag::InitialExpanded => record.initial_expanded = true,
            ClassFlag::SymmetryExpanded => record.symmetry_expanded = true,
            ClassFlag::ExpandingOtherSym => record.expanding_other_sym = true,
            ClassFlag::ExpandingChildrenOnly => record.expanding_children_only = true,
        }
    }

    /// Query a flag on `label`.
    #[must_use]
    pub fn is(&self, label: Label, flag: ClassFlag) -> bool {
        let record = self.record(label);
        match flag {
            ClassFlag::Expandable => record.expandable,
            ClassFlag::InferralExpanded => record.inferral_expanded,
            ClassFlag::InitialExpanded => record.initial_expanded,
            ClassFlag::SymmetryExpanded => record.symmetry_expanded,
            ClassFlag::ExpandingOtherSym => record.expanding_other_sym,
            ClassFlag::ExpandingChildrenOnly => record.expanding_children_only,
        }
    }

    /// Advance the expansion-round counter, returning the new value.
    pub fn advance_expansion_round(&mut self, label: Label) -> u32 {
        let record = self.record_mut(label);
        record.expansion_round += 1;
        record.expansion_round
    }

    /// The current expansion round (number of expansion-strategy rounds
    /// already applied).
    #[must_use]
    pub fn expansion_round(&self, label: Label) -> u32 {
        self.record(label).expansion_round
    }

    /// `true` once `expansion_round` has reached `total_rounds`.
    #[must_use]
    pub fn is_expanded(&self, label: Label, total_rounds: usize) -> bool {
        self.expansion_round(label) as usize >= total_rounds
    }

    /// The tri-state emptiness flag, without forcing a decision.
    #[must_use]
    pub fn empty(&self, label: Label) -> Option<bool> {
        self.record(label).empty
    }

    /// Decide the emptiness of `label`.
    ///
    /// # Panics
    ///
    /// Panics if emptiness was already decided with a different value — the
    /// flag is immutable once set (`spec.md` §4.1 invariant, restated as
    /// testable property 8).
    pub fn set_empty(&mut self, label: Label, value: bool) {
        let record = self.record_mut(label);
        match record.empty {
            Some(existing) => assert!(
                existing == value,
                "empty flag for {label} is immutable: was {existing}, got {value}"
            ),
            None => {
                record.empty = Some(value);
                if value {
                    record.strategy_verified = true;
                    record.verification_reason =
                        Some("Contains no avoiding objects.".to_string());
                }
            }
        }
    }

    /// Mark `label` verified by a (non-emptiness) strategy.
    pub fn mark_strategy_verified(&mut self, label: Label, reason: impl Into<String>) {
        let record = self.record_mut(label);
        record.strategy_verified = true;
        record.verification_reason.get_or_insert_with(|| reason.into());
    }

    /// Whether `label` has been verified by *some* strategy (not counting
    /// equivalence propagation, which [`crate::equivdb::EquivDb`] handles).
    #[must_use]
    pub fn strategy_verified(&self, label: Label) -> bool {
        self.record(label).strategy_verified
    }

    /// The recorded verification reason, if any.
    #[must_use]
    pub fn verification_reason(&self, label: Label) -> Option<&str> {
        self.record(label).verification_reason.as_deref()
    }

    /// Number of labels registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty_db(&self) -> bool {
        self.classes.is_empty()
    }

    /// All labels in allocation order.
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        (0..self.classes.len() as u32).map(Label::from_raw)
    }
}

/// A content-addressed, serializable snapshot of a [`ClassDb`] (`spec.md`
/// §6 "Snapshot format", reserved key `classdb`).
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassDbSnapshot<C> {
    pub classes: Vec<C>,
    pub records: Vec<ClassRecord>,
}

impl<C: CombinatorialClass> ClassDb<C> {
    /// Snapshot the database for serialization.
    #[must_use]
    pub fn to_snapshot(&self) -> ClassDbSnapshot<C> {
        ClassDbSnapshot {
            classes: self.classes.iter().map(|c| (**c).clone()).collect(),
            records: self.records.clone(),
        }
    }

    /// Rebuild a database from a snapshot, preserving label assignment
    /// (label `i` is `snapshot.classes[i]`).
    #[must_use]
    pub fn from_snapshot(snapshot: ClassDbSnapshot<C>) -> Self {
        let mut index = HashMap::with_capacity(snapshot.classes.len());
        let mut classes = Vec::with_capacity(snapshot.classes.len());
        for (i, class) in snapshot.classes.into_iter().enumerate() {
            let arc = Arc::new(class);
            index.insert(Arc::clone(&arc), Label::from_raw(i as u32));
            classes.push(arc);
        }
        let next = classes.len() as u32;
        Self {
            classes,
            index,
            records: snapshot.records,
            allocator: LabelAllocator::from_next(next),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::FixtureClass;

    #[test]
    fn add_is_idempotent_on_equal_classes() {
        let mut db = ClassDb::new();
        let a = db.add(FixtureClass::leaf("a"), AddFlags::default());
        let b = db.add(FixtureClass::leaf("a"), AddFlags::default());
        assert_eq!(a, b, "content-equal classes must share a label");
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn get_label_round_trips_get_class() {
        let mut db = ClassDb::new();
        let class = FixtureClass::leaf("x");
        let label = db.add(class.clone(), AddFlags::default());
        assert_eq!(db.get_label(db.get_class(label)), label);
    }

    #[test]
    #[should_panic(expected = "never added")]
    fn get_label_panics_on_unknown_class() {
        let db: ClassDb<FixtureClass> = ClassDb::new();
        db.get_label(&FixtureClass::leaf("never seen"));
    }

    #[test]
    fn flags_are_monotone_on_readd() {
        let mut db = ClassDb::new();
        let label = db.add(
            FixtureClass::leaf("a"),
            AddFlags {
                expandable: true,
                ..Default::default()
            },
        );
        db.mark(label, ClassFlag::InferralExpanded);
        // Re-adding without expandable must not clear it, and must not
        // clear inferral_expanded either.
        db.add(FixtureClass::leaf("a"), AddFlags::default());
        assert!(db.is(label, ClassFlag::Expandable));
        assert!(db.is(label, ClassFlag::InferralExpanded));
    }

    #[test]
    fn set_empty_true_also_verifies() {
        let mut db = ClassDb::new();
        let label = db.add(FixtureClass::leaf("a"), AddFlags::default());
        db.set_empty(label, true);
        assert_eq!(db.empty(label), Some(true));
        assert!(db.strategy_verified(label));
        assert_eq!(
            db.verification_reason(label),
            Some("Contains no avoiding objects.")
        );
    }

    #[test]
    #[should_panic(expected = "immutable")]
    fn set_empty_twice_with_different_value_panics() {
        let mut db = ClassDb::new();
        let label = db.add(FixtureClass::leaf("a"), AddFlags::default());
        db.set_empty(label, true);
        db.set_empty(label, false);
    }

    #[test]
    fn set_empty_twice_with_same_value_is_a_no_op() {
        let mut db = ClassDb::new();
        let label = db.add(FixtureClass::leaf("a"), AddFlags::default());
        db.set_empty(label, false);
        db.set_empty(label, false);
        assert_eq!(db.empty(label), Some(false));
    }

    #[test]
    fn snapshot_round_trips() {
        let mut db = ClassDb::new();
        let label = db.add(
            FixtureClass::leaf("a"),
            AddFlags {
                expandable: true,
                ..Default::default()
            },
        );
        db.mark(label, ClassFlag::InitialExpanded);
        let snapshot = db.to_snapshot();
        let restored = ClassDb::from_snapshot(snapshot);
        assert_eq!(restored.get_label(db.get_class(label)), label);
        assert!(restored.is(label, ClassFlag::InitialExpanded));
    }
}
