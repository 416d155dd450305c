//! The rule hypergraph: parent label → sorted tuple of child labels.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::combinator::Combinator;
use crate::label::Label;

/// One stored rule: `parent → children` with its formal step and
/// combinator.
///
/// `children` is always kept sorted ascending (`spec.md` §3: "The child
/// tuple is sorted so that permutations collapse; multiplicities are
/// preserved").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEntry {
    pub parent: Label,
    pub children: Vec<Label>,
    pub explanation: String,
    pub combinator: Combinator,
}

/// A directed hypergraph of productions.
///
/// Iteration (`spec.md` §4.3) yields `(parent, children)` pairs in
/// insertion order. Re-adding the same `(parent, sorted children)` pair
/// overwrites its explanation/combinator in place but keeps its original
/// position in that order (`spec.md` §9 Open Question, resolved in
/// `SPEC_FULL.md` §2 against `original_source/rule_db.py`'s set-union
/// `add`, which likewise never reorders on a repeat key).
#[derive(Default)]
pub struct RuleDb {
    entries: Vec<RuleEntry>,
    index: HashMap<(Label, Vec<Label>), usize>,
}

impl RuleDb {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or overwrite) a rule.
    ///
    /// `children` is sorted in place by this call; callers do not need to
    /// pre-sort.
    pub fn add(
        &mut self,
        parent: Label,
        mut children: Vec<Label>,
        explanation: impl Into<String>,
        combinator: Combinator,
    ) {
        children.sort_unstable();
        let key = (parent, children.clone());
        let explanation = explanation.into();
        if let Some(&position) = self.index.get(&key) {
            let entry = &mut self.entries[position];
            entry.explanation = explanation;
            entry.combinator = combinator;
            tracing::trace!(%parent, "rule replaced at existing position");
            return;
        }
        let position = self.entries.len();
        self.entries.push(RuleEntry {
            parent,
            children,
            explanation,
            combinator,
        });
        self.index.insert(key, position);
        tracing::trace!(%parent, "rule added");
    }

    /// Remove a rule, if present.
    ///
    /// Per `spec.md` §5, this exists for higher-level consumers outside the
    /// core; the core's own driver and tree searcher never call it.
    pub fn remove(&mut self, parent: Label, children: &[Label]) {
        let mut sorted = children.to_vec();
        sorted.sort_unstable();
        let key = (parent, sorted);
        if let Some(position) = self.index.remove(&key) {
            self.entries.remove(position);
            // Every index past `position` shifted down by one.
            for value in self.index.values_mut() {
                if *value > position {
                    *value -= 1;
                }
            }
        }
    }

    /// All rules, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleEntry> {
        self.entries.iter()
    }

    /// All rules whose parent is `label`.
    pub fn rules_for(&self, label: Label) -> impl Iterator<Item = &RuleEntry> {
        self.entries.iter().filter(move |rule| rule.parent == label)
    }

    /// Whether any rule exists for `parent → children` (order-insensitive).
    #[must_use]
    pub fn contains(&self, parent: Label, children: &[Label]) -> bool {
        let mut sorted = children.to_vec();
        sorted.sort_unstable();
        self.index.contains_key(&(parent, sorted))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A serializable snapshot of a [`RuleDb`] (`spec.md` §6, reserved key
/// `ruledb`).
#[derive(Debug, Serialize, Deserialize)]
pub struct RuleDbSnapshot {
    pub entries: Vec<RuleEntry>,
}

impl RuleDb {
    #[must_use]
    pub fn to_snapshot(&self) -> RuleDbSnapshot {
        RuleDbSnapshot {
            entries: self.entries.clone(),
        }
    }

    #[must_use]
    pub fn from_snapshot(snapshot: RuleDbSnapshot) -> Self {
        let mut db = Self::default();
        for entry in snapshot.entries {
            db.add(entry.parent, entry.children, entry.explanation, entry.combinator);
        }
        db
    }
}
